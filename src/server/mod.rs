mod options;

use std::io::{self, BufRead};

use anyhow::{anyhow, Context};
pub use options::ServerOptions;

use crate::board::Board;
use crate::parse::{parse_from_file, parse_from_str};

/// A small built-in 3x3 board, used when no `--file` is given.
const DEMO_BOARD: &str = "3x3\nunicorn\nunicorn\nrainbow\nrainbow\nstar\nstar\nsun\nsun\nmoon\n";

/// A line-oriented demonstration of the Board's external interface.
///
/// This is explicitly NOT a production HTTP/RPC surface: it does no
/// framing, no authentication, and is not meant to be exposed to untrusted
/// clients or soak-tested as a production service. It is a thin
/// stdin/stdout loop over the real engine underneath, nothing more.
pub struct TextProtocolServer {
    board: Board,
}

impl TextProtocolServer {
    pub fn new(options: &ServerOptions) -> anyhow::Result<TextProtocolServer> {
        let board = match &options.file {
            Some(path) => parse_from_file(path)
                .with_context(|| format!("failed to parse board file {}", path.display()))?,
            None => parse_from_str(DEMO_BOARD).expect("built-in demo board is well-formed"),
        };
        Ok(TextProtocolServer { board })
    }

    /// Runs the REPL to completion (until `quit` or end of input).
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let args: Vec<&str> = line.split_whitespace().collect();
            let cmd = *args.first().unwrap_or(&"");

            if cmd == "quit" {
                println!("ok");
                break;
            }

            self.apply(cmd, &args[1..]);
        }
        Ok(())
    }

    fn apply(&mut self, cmd: &str, args: &[&str]) {
        let result = match cmd {
            "" => Ok(()),
            "look" => self.cmd_look(args),
            "flip" => self.cmd_flip(args),
            "watch" => self.cmd_watch(args),
            "map" => self.cmd_map(args),
            _ => Err(anyhow!("unrecognized command {cmd}")),
        };

        match result {
            Ok(()) => log::debug!("command completed: {cmd} {}", args.join(" ")),
            Err(err) => {
                println!("err\n{err}");
                log::warn!("recoverable error on {cmd}: {err}");
            }
        }
    }

    fn cmd_look(&mut self, args: &[&str]) -> anyhow::Result<()> {
        let player = args.first().ok_or_else(|| anyhow!("usage: look <player>"))?;
        println!("{}", self.board.look(player)?);
        Ok(())
    }

    fn cmd_flip(&mut self, args: &[&str]) -> anyhow::Result<()> {
        let [player, row, col] = args else {
            return Err(anyhow!("usage: flip <player> <row> <col>"));
        };
        let row: usize = row.parse().context("row must be a non-negative integer")?;
        let col: usize = col.parse().context("col must be a non-negative integer")?;
        println!("{}", self.board.flip(player, row, col)?);
        Ok(())
    }

    fn cmd_watch(&mut self, args: &[&str]) -> anyhow::Result<()> {
        let player = args.first().ok_or_else(|| anyhow!("usage: watch <player>"))?;
        println!("{}", self.board.watch(player)?);
        Ok(())
    }

    fn cmd_map(&mut self, _args: &[&str]) -> anyhow::Result<()> {
        self.board.map(|v| Ok(v.to_uppercase()))?;
        println!("ok");
        Ok(())
    }
}
