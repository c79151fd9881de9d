// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate clap;

#[macro_use]
extern crate pest_derive;

use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::process;
use std::time::{Duration, Instant};

use clap::{App, Arg, ArgMatches, SubCommand};
use log::{debug, warn};
use pest::iterators::Pair;
use pest::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;

use arbiter::{
    perft, Board, Coordinate, Game, GameConfig, GameObserver, GameState, Move, Outcome,
    PieceKind, Team, TEAMS,
};

#[derive(Parser)]
#[grammar = "bin/command.pest"]
pub struct CommandParser;

#[derive(Debug, PartialEq)]
enum Command {
    Move(Coordinate, Coordinate),
    Promote(PieceKind),
    Moves(Option<Coordinate>),
    Board,
    History { csv: bool },
    Fen,
    Clock,
    Timeout(Team),
    Restart,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  e2e4 | e2-e4 | move e2 e4   move a piece
  promote <q|r|b|n>           choose a promotion piece
  moves [square]              list legal moves
  board                       print the board
  history [csv]               print the move history
  fen                         print the position as FEN
  clock                       print both clocks
  timeout <white|black>       flag a side as out of time
  restart                     start a new game
  quit                        leave";

fn square(pair: Option<Pair<Rule>>) -> Result<Coordinate, String> {
    let text = pair.map(|p| p.as_str()).unwrap_or("");
    Coordinate::try_from(text).map_err(|_| format!("invalid square '{}'", text))
}

fn piece_kind(pair: Option<Pair<Rule>>) -> Result<PieceKind, String> {
    let text = pair.map(|p| p.as_str()).unwrap_or("");
    match text.to_ascii_lowercase().as_str() {
        "queen" | "q" => Ok(PieceKind::Queen),
        "rook" | "r" => Ok(PieceKind::Rook),
        "bishop" | "b" => Ok(PieceKind::Bishop),
        "knight" | "n" => Ok(PieceKind::Knight),
        _ => Err(format!("invalid piece '{}'", text)),
    }
}

fn team(pair: Option<Pair<Rule>>) -> Result<Team, String> {
    let text = pair.map(|p| p.as_str()).unwrap_or("");
    Team::try_from(text.to_ascii_lowercase().as_str())
        .map_err(|_| format!("invalid team '{}'", text))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut pairs = CommandParser::parse(Rule::command, line).map_err(|e| e.to_string())?;
    let cmd = pairs
        .next()
        .and_then(|command| command.into_inner().next())
        .ok_or_else(|| "empty command".to_owned())?;

    let rule = cmd.as_rule();
    let mut args = cmd.into_inner();
    let command = match rule {
        Rule::move_cmd => {
            let from = square(args.next())?;
            let to = square(args.next())?;
            Command::Move(from, to)
        }
        Rule::promote_cmd => Command::Promote(piece_kind(args.next())?),
        Rule::moves_cmd => match args.next() {
            Some(pair) => Command::Moves(Some(square(Some(pair))?)),
            None => Command::Moves(None),
        },
        Rule::board_cmd => Command::Board,
        Rule::history_cmd => Command::History {
            csv: args.next().is_some(),
        },
        Rule::fen_cmd => Command::Fen,
        Rule::clock_cmd => Command::Clock,
        Rule::timeout_cmd => Command::Timeout(team(args.next())?),
        Rule::restart_cmd => Command::Restart,
        Rule::help_cmd => Command::Help,
        Rule::quit_cmd => Command::Quit,
        other => return Err(format!("unexpected {:?}", other)),
    };

    Ok(command)
}

struct ConsoleObserver;

impl GameObserver for ConsoleObserver {
    fn board_changed(&self, board: &Board) {
        println!("{}", board);
    }

    fn move_played(&self, mov: &Move) {
        println!("{} plays {}", mov.team(), mov);
    }

    fn promotion_requested(&self, team: Team, at: Coordinate) {
        println!(
            "{} pawn on {} promotes: choose queen, rook, bishop or knight",
            team, at
        );
    }

    fn game_over(&self, outcome: Outcome) {
        if outcome.checkmate {
            println!("checkmate, {} wins", outcome.winner);
        } else {
            println!("time is up, {} wins", outcome.winner);
        }
    }
}

fn print_clocks(game: &Game) {
    for &team in &TEAMS {
        match game.clock(team) {
            Some(clock) => println!("{:>5}: {}", team, clock),
            None => println!("{:>5}: untimed", team),
        }
    }
}

fn prompt(game: &Game) {
    match game.state() {
        GameState::AwaitingMove => print!("{} to move> ", game.board().side_to_move()),
        GameState::AwaitingPromotionChoice { pawn } => print!("{} promotes> ", pawn.team()),
        GameState::GameOver(_) => print!("game over> "),
    }

    let _ = io::stdout().flush();
}

fn random_reply<R: Rng>(game: &mut Game, rng: &mut R) {
    if *game.state() != GameState::AwaitingMove || game.board().side_to_move() != Team::Opponent {
        return;
    }

    let moves = game.board().legal_move_pairs();
    if let Some(&(from, to)) = moves.choose(rng) {
        debug!("random opponent picks {}-{} of {}", from, to, moves.len());
        game.attempt_move(from, to);
        if game.pending_promotion().is_some() {
            game.resolve_promotion(PieceKind::Queen);
        }
    }
}

fn run_command(game: &mut Game, command: Command) {
    match command {
        Command::Move(from, to) => {
            if !game.attempt_move(from, to) {
                println!("illegal move: {}-{}", from, to);
            }
        }
        Command::Promote(kind) => {
            if !game.resolve_promotion(kind) {
                println!("no promotion pending");
            }
        }
        Command::Moves(Some(at)) => match game.board().piece_at(at).and_then(|p| p.legal_moves()) {
            Some(moves) => {
                let names: Vec<_> = moves.iter().map(|m| m.to_string()).collect();
                println!("{}: {}", at, names.join(" "));
            }
            None => println!("{}: no moves", at),
        },
        Command::Moves(None) => {
            let names: Vec<_> = game
                .board()
                .legal_move_pairs()
                .into_iter()
                .map(|(from, to)| format!("{}{}", from, to))
                .collect();
            println!("{}", names.join(" "));
        }
        Command::Board => println!("{}", game.board()),
        Command::History { csv: false } => print!("{}", game.history().numbered()),
        Command::History { csv: true } => {
            if let Err(e) = game.history().write_csv(io::stdout()) {
                warn!("failed to write history: {}", e);
            }
        }
        Command::Fen => println!("{}", game.board().as_fen()),
        Command::Clock => print_clocks(game),
        Command::Timeout(team) => game.timeout(team),
        Command::Restart => game.restart(),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn load_config(matches: &ArgMatches) -> GameConfig {
    if matches.is_present("untimed") {
        return GameConfig::untimed();
    }

    let path = match matches.value_of("config") {
        Some(path) => path,
        None => return GameConfig::default(),
    };

    let loaded = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| GameConfig::from_reader(file).map_err(|e| e.to_string()));
    match loaded {
        Ok(config) => config,
        Err(e) => {
            println!("failed to load config {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn run_play(matches: &ArgMatches) -> ! {
    let config = load_config(matches);
    let mut rng = if matches.is_present("seed") {
        StdRng::seed_from_u64(value_t_or_exit!(matches, "seed", u64))
    } else {
        StdRng::from_entropy()
    };
    let random_opponent = matches.is_present("random-opponent");

    let mut game = Game::new(config);
    game.subscribe(Box::new(ConsoleObserver));
    println!("{}", game.board());
    prompt(&game);

    let stdin = io::stdin();
    let mut last = Instant::now();
    let mut carry = Duration::from_secs(0);
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read input: {}", e);
                break;
            }
        };

        // Whole seconds are charged to the side to move; the remainder carries over.
        let elapsed = carry + last.elapsed();
        last = Instant::now();
        carry = elapsed - Duration::from_secs(elapsed.as_secs());
        game.tick(elapsed.as_secs() as u32);

        let line = line.trim();
        if !line.is_empty() {
            match parse_command(line) {
                Ok(Command::Quit) => break,
                Ok(command) => run_command(&mut game, command),
                Err(e) => println!("{}", e),
            }
        }

        if random_opponent {
            random_reply(&mut game, &mut rng);
        }

        prompt(&game);
    }

    println!();
    process::exit(0);
}

fn run_perft(matches: &ArgMatches) -> ! {
    let fen = matches.value_of("FEN").unwrap();
    let depth = value_t_or_exit!(matches, "depth", u32);
    let board = match Board::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            println!("invalid fen: {:?}", e);
            process::exit(1);
        }
    };

    println!("fen:   {}", fen);
    println!("depth: {}", depth);
    println!();
    println!("{}", board);
    for i in 1..depth + 1 {
        let start = Instant::now();
        let results = perft(&board, i);
        let duration = start.elapsed();
        let ms = duration.as_secs() * 1000 + u64::from(duration.subsec_millis());
        println!("perft({}) = {} ({} ms)", i, results, ms);
    }

    process::exit(0);
}

fn run_moves(matches: &ArgMatches) -> ! {
    let fen = matches.value_of("FEN").unwrap();
    let board = match Board::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            println!("invalid fen: {:?}", e);
            process::exit(1);
        }
    };

    let side = board.side_to_move();
    let pairs = board.legal_move_pairs();
    if matches.is_present("json") {
        let moves: Vec<_> = pairs
            .iter()
            .map(|&(from, to)| json!({ "from": from, "to": to }))
            .collect();
        let value = json!({
            "fen": board.as_fen(),
            "side_to_move": side.to_string(),
            "check": board.is_check(side),
            "checkmate": board.is_checkmate(),
            "moves": moves,
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                println!("failed to serialize moves: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", board);
        println!("{} to move, {} legal moves", side, pairs.len());
        for (from, to) in pairs {
            println!("{}{}", from, to);
        }
    }

    process::exit(0);
}

fn main() {
    env_logger::init();
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .subcommand(
            SubCommand::with_name("play")
                .about("Play a game on the console")
                .arg(
                    Arg::with_name("config")
                        .help("JSON game configuration")
                        .value_name("FILE")
                        .short("-c")
                        .long("--config")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("untimed")
                        .help("Play without clocks")
                        .long("--untimed"),
                )
                .arg(
                    Arg::with_name("random-opponent")
                        .help("Let black play random legal moves")
                        .short("-r")
                        .long("--random-opponent"),
                )
                .arg(
                    Arg::with_name("seed")
                        .help("Seed for the random opponent")
                        .value_name("SEED")
                        .long("--seed")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("perft")
                .about("PERFT analysis of board positions")
                .arg(
                    Arg::with_name("FEN")
                        .help("FEN string for a board position")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("depth")
                        .help("Depth of move tree to search")
                        .value_name("DEPTH")
                        .short("-d")
                        .long("--depth")
                        .takes_value(true)
                        .default_value("1"),
                ),
        )
        .subcommand(
            SubCommand::with_name("moves")
                .about("List the legal moves of a board position")
                .arg(
                    Arg::with_name("FEN")
                        .help("FEN string for a board position")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("json")
                        .help("Print the moves as JSON")
                        .long("--json"),
                ),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("perft") {
        run_perft(matches);
    }

    if let Some(matches) = matches.subcommand_matches("moves") {
        run_moves(matches);
    }

    if let Some(matches) = matches.subcommand_matches("play") {
        run_play(matches);
    }

    run_play(&ArgMatches::default());
}
