//! Terminal debugging console.
//!
//! Parses one line of input into a `Command`, runs it against a
//! `Session`, and renders the result as plain text. The line editor
//! itself lives in the binary.

use std::fmt::Write as _;
use std::str::FromStr;

use blackout_kernel::cards::Card;
use blackout_kernel::domain::{GameState, TransitionResult};
use blackout_kernel::rules;
use blackout_kernel::seats::Seat;
use blackout_kernel::view::{self, PlayerView};

use crate::error::{Result, RuntimeError};
use crate::session::Session;

pub const HELP: &str = "\
commands:
  deal             shuffle and deal the next round
  bid <n>          bid for the seat to act
  play <card>      play a card for the seat to act (e.g. QS, 10h, as)
  hand [seat]      show a hand (default: seat to act)
  view <seat>      show what one seat can see
  legal            list legal bids or cards for the seat to act
  state            dump the whole game state
  scores           standings, best first
  hash             canonical state hash and sequence
  auto [n]         take n random legal actions (default 1)
  replay           rebuild the state from the event log
  help             this text
  quit             leave the console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Deal,
    Bid(u8),
    Play(Card),
    Hand(Option<Seat>),
    View(Seat),
    Legal,
    State,
    Scores,
    Hash,
    Auto(usize),
    Replay,
    Help,
    Quit,
}

fn bad(msg: impl Into<String>) -> RuntimeError {
    RuntimeError::Command(msg.into())
}

fn number<T: FromStr>(arg: Option<&str>, usage: &str) -> Result<T> {
    arg.ok_or_else(|| bad(format!("usage: {}", usage)))?
        .parse()
        .map_err(|_| bad(format!("usage: {}", usage)))
}

impl FromStr for Command {
    type Err = RuntimeError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| bad("empty command"))?;
        let arg = words.next();
        if words.next().is_some() {
            return Err(bad(format!("too many arguments to '{}'", name)));
        }

        let cmd = match name.to_ascii_lowercase().as_str() {
            "deal" => Command::Deal,
            "bid" => Command::Bid(number(arg, "bid <n>")?),
            "play" => {
                let text = arg.ok_or_else(|| bad("usage: play <card>"))?;
                Command::Play(text.parse()?)
            }
            "hand" => Command::Hand(arg.map(|a| number(Some(a), "hand [seat]")).transpose()?),
            "view" => Command::View(number(arg, "view <seat>")?),
            "legal" => Command::Legal,
            "state" | "dump" => Command::State,
            "scores" => Command::Scores,
            "hash" => Command::Hash,
            "auto" => Command::Auto(match arg {
                Some(a) => number(Some(a), "auto [n]")?,
                None => 1,
            }),
            "replay" => Command::Replay,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(bad(format!("unknown command '{}' (try 'help')", other))),
        };
        Ok(cmd)
    }
}

/// What a command printed, and whether the console should exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub quit: bool,
}

impl Outcome {
    fn text(output: String) -> Self {
        Self {
            output,
            quit: false,
        }
    }
}

/// Run one command against the session.
pub fn execute(session: &mut Session, cmd: Command) -> Result<Outcome> {
    let output = match cmd {
        Command::Deal => {
            let result = session.deal()?;
            describe(session.state(), &result)
        }
        Command::Bid(bid) => {
            let result = session.bid(bid)?;
            describe(session.state(), &result)
        }
        Command::Play(card) => {
            let result = session.play(card)?;
            describe(session.state(), &result)
        }
        Command::Hand(seat) => {
            let state = session.state();
            let seat = seat.or(state.to_act).unwrap_or(0);
            let player = state
                .player(seat)
                .ok_or_else(|| bad(format!("no seat {}", seat)))?;
            format!("seat {}: {}", seat, cards(&player.hand))
        }
        Command::View(seat) => render_view(&PlayerView::for_seat(session.state(), seat)?),
        Command::Legal => render_legal(session.state()),
        Command::State => dump_state(session.state()),
        Command::Scores => render_scores(session.state()),
        Command::Hash => format!(
            "sequence {} hash {}",
            session.current_sequence(),
            session.current_hash()
        ),
        Command::Auto(n) => {
            let mut out = String::new();
            for _ in 0..n {
                match session.auto_step()? {
                    Some(result) => {
                        let line = describe(session.state(), &result);
                        let _ = writeln!(out, "{}", line);
                    }
                    None => break,
                }
            }
            if out.is_empty() {
                out.push_str("nothing to do");
            }
            out.trim_end().to_string()
        }
        Command::Replay => {
            let (_, hash) = session.replay_full()?;
            format!(
                "replayed {} events, hash {}",
                session.current_sequence(),
                hash
            )
        }
        Command::Help => HELP.to_string(),
        Command::Quit => {
            return Ok(Outcome {
                output: "bye".to_string(),
                quit: true,
            })
        }
    };
    Ok(Outcome::text(output))
}

fn cards(hand: &[Card]) -> String {
    if hand.is_empty() {
        return "-".to_string();
    }
    hand.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per notable thing an event caused.
pub fn describe(state: &GameState, result: &TransitionResult) -> String {
    let mut out = result.event_type.replace('_', " ");
    if let Some(winner) = result.trick_winner {
        let _ = write!(out, ": seat {} takes the trick", winner);
    }
    for r in &result.round_records {
        let _ = write!(
            out,
            "\n  round {} seat {}: bid {} won {} -> +{}",
            r.round, r.seat, r.bid, r.won, r.points
        );
    }
    if result.game_over {
        let winners: Vec<String> = view::winners(state).iter().map(|s| s.to_string()).collect();
        let _ = write!(out, "\ngame over, winner(s): seat {}", winners.join(", seat "));
    } else if let Some(seat) = state.to_act {
        let _ = write!(out, "\n{} seat {} to act", state.phase.as_str(), seat);
    } else {
        let _ = write!(out, "\n{}", state.phase.as_str());
    }
    out
}

/// Full debugging dump of the table and every player.
pub fn dump_state(state: &GameState) -> String {
    let mut out = String::new();
    let trump = state
        .trump_card
        .map_or_else(|| "none".to_string(), |c| c.to_string());
    let opt = |s: Option<Seat>| s.map_or_else(|| "-".to_string(), |s| s.to_string());

    let _ = writeln!(out, "num_players = {}", state.config.num_players);
    let _ = writeln!(
        out,
        "max_tricks = {} (requested {})",
        state.config.max_tricks, state.config.requested_max_tricks
    );
    let _ = writeln!(
        out,
        "round = {} of {}",
        state.round,
        rules::total_rounds(state.config.max_tricks.max(1))
    );
    let _ = writeln!(out, "dealer = {}", state.dealer);
    let _ = writeln!(out, "tricks_in_round = {}", state.tricks_in_round);
    let _ = writeln!(out, "phase = {}", state.phase.as_str());
    let _ = writeln!(out, "trump = {}", trump);
    let _ = writeln!(out, "to_act = {}", opt(state.to_act));
    let _ = writeln!(out, "trick_leader = {}", opt(state.trick_leader));
    let played: Vec<String> = state
        .current_trick
        .iter()
        .map(|p| format!("{}:{}", p.seat, p.card))
        .collect();
    let _ = writeln!(out, "current_trick = [{}]", played.join(" "));
    let _ = writeln!(out, "completed_tricks = {}", state.completed_tricks.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "player data:");
    for p in &state.players {
        let bid = p.bid.map_or_else(|| "-".to_string(), |b| b.to_string());
        let _ = writeln!(
            out,
            "     player {} : bid {} won {} score {} hand {}",
            p.seat,
            bid,
            p.tricks_won,
            p.score,
            cards(&p.hand)
        );
    }
    out.trim_end().to_string()
}

pub fn render_view(v: &PlayerView) -> String {
    let mut out = String::new();
    let trump = v.trump_card.map_or_else(|| "none".to_string(), |c| c.to_string());
    let _ = writeln!(
        out,
        "seat {} | {} | round {}/{} ({} tricks) | dealer {} | trump {}",
        v.seat,
        v.phase.as_str(),
        v.round,
        v.total_rounds,
        v.tricks_in_round,
        v.dealer,
        trump
    );
    let _ = writeln!(out, "hand: {}", cards(&v.hand));
    for seat in 0..v.hand_sizes.len() {
        let bid = v.bids[seat].map_or_else(|| "-".to_string(), |b| b.to_string());
        let marker = if v.to_act == Some(seat) { " <" } else { "" };
        let _ = writeln!(
            out,
            "  seat {}: {} cards, bid {}, won {}, score {}{}",
            seat, v.hand_sizes[seat], bid, v.tricks_won[seat], v.scores[seat], marker
        );
    }
    if !v.current_trick.is_empty() {
        let played: Vec<String> = v
            .current_trick
            .iter()
            .map(|p| format!("{}:{}", p.seat, p.card))
            .collect();
        let _ = writeln!(out, "trick: {}", played.join(" "));
    }
    out.trim_end().to_string()
}

fn render_legal(state: &GameState) -> String {
    let bids = view::legal_bids(state);
    if !bids.is_empty() {
        let list: Vec<String> = bids.iter().map(|b| b.to_string()).collect();
        return format!("legal bids: {}", list.join(" "));
    }
    let legal = view::legal_cards(state);
    if !legal.is_empty() {
        return format!("legal cards: {}", cards(&legal));
    }
    format!("no choices in phase {}", state.phase.as_str())
}

fn render_scores(state: &GameState) -> String {
    view::standings(state)
        .iter()
        .enumerate()
        .map(|(place, (seat, score))| format!("{}. seat {} - {}", place + 1, seat, score))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackout_kernel::cards::{Rank, Suit};
    use blackout_kernel::domain::Phase;
    use std::path::PathBuf;

    fn temp_session(name: &str) -> Session {
        let dir: PathBuf = std::env::temp_dir().join("blackout_console_tests").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        Session::new(&dir, "s", 0, Some(7)).unwrap()
    }

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!("deal".parse::<Command>().unwrap(), Command::Deal);
        assert_eq!(" BID 2 ".parse::<Command>().unwrap(), Command::Bid(2));
        assert_eq!(
            "play 10h".parse::<Command>().unwrap(),
            Command::Play(Card::new(Suit::Heart, Rank::TEN))
        );
        assert_eq!("hand".parse::<Command>().unwrap(), Command::Hand(None));
        assert_eq!("hand 3".parse::<Command>().unwrap(), Command::Hand(Some(3)));
        assert_eq!("auto".parse::<Command>().unwrap(), Command::Auto(1));
        assert_eq!("auto 40".parse::<Command>().unwrap(), Command::Auto(40));
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_bad_input() {
        for line in ["", "fly", "bid", "bid x", "play ZZ", "view", "deal now please"] {
            assert!(line.parse::<Command>().is_err(), "accepted {:?}", line);
        }
    }

    #[test]
    fn auto_runs_a_game_to_the_end() {
        let mut session = temp_session("auto");
        session.start_game(3, 2, Some(0)).unwrap();
        let out = execute(&mut session, Command::Auto(1000)).unwrap();
        assert!(out.output.contains("game over"), "{}", out.output);
        assert_eq!(session.state().phase, Phase::GameOver);

        let scores = execute(&mut session, Command::Scores).unwrap().output;
        assert_eq!(scores.lines().count(), 3);
    }

    #[test]
    fn dump_lists_every_player() {
        let mut session = temp_session("dump");
        session.start_game(4, 3, Some(1)).unwrap();
        execute(&mut session, Command::Deal).unwrap();
        let dump = execute(&mut session, Command::State).unwrap().output;
        assert!(dump.contains("dealer = 1"));
        assert!(dump.contains("phase = bidding"));
        assert_eq!(dump.matches("     player ").count(), 4);
    }

    #[test]
    fn quit_sets_the_flag() {
        let mut session = temp_session("quit");
        assert!(execute(&mut session, Command::Quit).unwrap().quit);
        assert!(!execute(&mut session, Command::Help).unwrap().quit);
    }
}
