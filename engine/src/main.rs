use std::error::Error;

use primes_common::{
    models::Direction,
    protocol::{Command, GameEvent},
};
use primes_engine::{
    config::{EventFormat, GameConfig},
    game::Game,
    render::render,
    storage::JsonFileStorage,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time,
};
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

enum Input {
    Command(Command),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let direction = |direction| Some(Input::Command(Command::Move { direction }));
    match line.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => direction(Direction::Up),
        "s" | "down" => direction(Direction::Down),
        "a" | "left" => direction(Direction::Left),
        "d" | "right" => direction(Direction::Right),
        "r" | "restart" => Some(Input::Command(Command::Restart)),
        "q" | "quit" => Some(Input::Quit),
        _ => None,
    }
}

fn print_events(game: &Game, events: &[GameEvent], format: EventFormat) -> Result<()> {
    match format {
        EventFormat::Json => {
            for event in events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        EventFormat::Text => {
            if events.is_empty() {
                return Ok(());
            }
            print!("{}", render(game.board(), game.score(), game.high_score()));
            if events
                .iter()
                .any(|event| matches!(event, GameEvent::GameOver { .. }))
            {
                println!("Game over - r to restart, q to quit");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("🚀 Starting primes");

    let config = GameConfig::from_env();
    let storage = JsonFileStorage::open_or_empty(&config.high_score_file);
    let format = config.event_format;
    let mut interval = time::interval(config.tick);

    let mut game = Game::new(config, Box::new(storage));
    let (subscriber, mut events) = game.subscribe();
    game.start();

    info!("🎮 w/a/s/d to move, r to restart, q to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_tick = time::Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_input(&line) {
                    Some(Input::Command(command)) => {
                        debug!("Received command: {:?}", command);
                        game.handle(command);
                    }
                    Some(Input::Quit) => break,
                    None => warn!("Unknown input: {:?}", line),
                },
                None => break,
            },
            now = interval.tick() => {
                game.advance(now - last_tick);
                last_tick = now;
            }
        }

        let mut batch = Vec::new();
        while let Ok(event) = events.try_recv() {
            batch.push(event);
        }
        print_events(&game, &batch, format)?;
    }

    game.unsubscribe(&subscriber);
    game.save();
    info!(
        "👋 Leaving with score {}, high score {}",
        game.score(),
        game.high_score()
    );
    Ok(())
}
