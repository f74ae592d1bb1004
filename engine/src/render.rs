use crate::board::Board;

const MIN_CELL_WIDTH: usize = 4;

/// Draws the board as a text grid with a score line underneath.
pub fn render(board: &Board, score: u64, high_score: u64) -> String {
    let (width, height) = (board.grid().width(), board.grid().height());
    let mut labels = vec![vec![String::from("."); width]; height];
    for view in board.views() {
        labels[view.pos.y][view.pos.x] = view
            .label
            .unwrap_or_else(|| format!("?{}", view.value));
    }

    let cell_width = labels
        .iter()
        .flatten()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(MIN_CELL_WIDTH);
    let cell = format!("{}+", "-".repeat(cell_width + 2));
    let separator = format!("+{}\n", cell.repeat(width));

    let mut out = separator.clone();
    for row in labels {
        out.push('|');
        for label in row {
            out.push_str(&format!(" {:>cell_width$} |", label));
        }
        out.push('\n');
        out.push_str(&separator);
    }
    out.push_str(&format!("score {} | best {}\n", score, high_score));
    out
}
