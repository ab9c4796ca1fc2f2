//! UCI front end.
//!
//! The input thread reads commands from stdin and answers everything but
//! `go` itself. Each search runs on its own thread, which prints
//! `bestmove` when it finishes; `stop` only raises the stop flag.

mod protocol;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, bail};
use chess_core::{
    Engine, Position, SearchInfo, StopHandle, attacks, move_to_uci, perft_divide,
    set_position_from_uci,
};
use pvs_engine::{EngineConfig, PvsEngine};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use protocol::{parse_go, parse_setoption};

fn main() -> Result<()> {
    init_logging();
    let config = match config_path()? {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    attacks::init();

    let mut engine = PvsEngine::with_config(config).context("invalid engine config")?;
    engine.set_info_sink(Arc::new(|info: &SearchInfo| println!("{info}")));

    let mut session = Session::new(engine);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if !session.handle(&line) {
            break;
        }
    }
    session.finish_search();
    Ok(())
}

/// Logs go to stderr; stdout belongs to the protocol.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn config_path() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("--config") => match args.next() {
            Some(path) => Ok(Some(PathBuf::from(path))),
            None => bail!("--config needs a file path"),
        },
        Some(other) => bail!("unknown argument '{other}' (usage: uci_engine [--config <file.toml>])"),
    }
}

struct Search {
    handle: JoinHandle<()>,
    stop: StopHandle,
}

struct Session {
    engine: Arc<Mutex<PvsEngine>>,
    pos: Position,
    search: Option<Search>,
}

impl Session {
    fn new(engine: PvsEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            pos: Position::startpos(),
            search: None,
        }
    }

    /// Handles one input line; false on `quit`.
    fn handle(&mut self, line: &str) -> bool {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return true;
        };

        match command {
            "uci" => {
                let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
                println!("id name {}", engine.name());
                println!("id author {}", engine.author());
                for option in engine.options() {
                    println!("{option}");
                }
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                self.finish_search();
                self.pos = Position::startpos();
                self.engine
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .new_game();
            }
            "position" => match set_position_from_uci(args) {
                Ok(pos) => self.pos = pos,
                Err(err) => report(format!("position rejected: {err}")),
            },
            "go" => match parse_go(args) {
                Ok(limits) => {
                    self.finish_search();
                    let stop = limits.stop_handle();
                    let engine = Arc::clone(&self.engine);
                    let pos = self.pos.clone();
                    let spawned = thread::Builder::new().name("uci-search".into()).spawn(move || {
                        let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                        match engine.search(&pos, limits) {
                            Ok(result) => match result.best_move {
                                Some(mv) => match result.ponder {
                                    Some(ponder) => {
                                        println!("bestmove {} ponder {}", move_to_uci(mv), move_to_uci(ponder))
                                    }
                                    None => println!("bestmove {}", move_to_uci(mv)),
                                },
                                None => println!("bestmove 0000"),
                            },
                            Err(err) => {
                                report(format!("search failed: {err}"));
                                println!("bestmove 0000");
                            }
                        }
                    });
                    match spawned {
                        Ok(handle) => self.search = Some(Search { handle, stop }),
                        Err(err) => {
                            report(format!("could not start search: {err}"));
                            println!("bestmove 0000");
                        }
                    }
                }
                Err(err) => report(format!("go rejected: {err}")),
            },
            "stop" => {
                if let Some(search) = &self.search {
                    search.stop.stop();
                }
            }
            "setoption" => match parse_setoption(args) {
                Ok((name, value)) => {
                    self.finish_search();
                    let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(err) = engine.set_option(&name, &value) {
                        println!("info string {err}");
                    }
                }
                Err(err) => report(format!("setoption rejected: {err}")),
            },
            "perft" => match args.first().map(|d| d.parse::<u8>()) {
                Some(Ok(depth)) => {
                    let mut pos = self.pos.clone();
                    let mut total = 0;
                    for (mv, nodes) in perft_divide(&mut pos, depth) {
                        println!("{}: {nodes}", move_to_uci(mv));
                        total += nodes;
                    }
                    println!();
                    println!("Nodes searched: {total}");
                }
                _ => report("usage: perft <depth>".to_string()),
            },
            "d" => println!("{}", self.pos.to_fen()),
            "quit" => return false,
            other => info!(command = other, "ignoring unknown command"),
        }
        true
    }

    /// Stops a running search and waits for its `bestmove`.
    fn finish_search(&mut self) {
        if let Some(search) = self.search.take() {
            search.stop.stop();
            if search.handle.join().is_err() {
                warn!("search thread panicked");
            }
        }
    }
}

/// Input problems go to the log and to the GUI as `info string`.
fn report(message: String) {
    warn!("{message}");
    println!("info string {message}");
}
