//! Interactive operator session.
//!
//! Reads one line of data at a time, mines a block for it and prints the
//! whole chain when the operator types `q`.

use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::blockchain::Blockchain;
use crate::difficulty::Difficulty;
use crate::error::Result;
use crate::hash::{laboon_hash, to_hex, Hash, Nonce};
use crate::pow::{MiningObserver, ProofOfWork};

const PROMPT: &str = "Enter data > ";

pub struct Session<R, W> {
    input: R,
    output: W,
    pow: ProofOfWork,
    show_attempts: bool,
    blockchain: Blockchain,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, pow: ProofOfWork) -> Self {
        Session {
            input,
            output,
            pow,
            show_attempts: false,
            blockchain: Blockchain::new(),
        }
    }

    /// Print every candidate tried while mining.
    pub fn show_attempts(mut self, show: bool) -> Self {
        self.show_attempts = show;
        self
    }

    /// Runs until `q`/`Q` or end of input and returns the finished chain.
    pub fn run(mut self) -> Result<Blockchain> {
        info!("会话开始，难度: {}", self.pow.difficulty());
        while let Some(line) = self.read_line()? {
            if line.eq_ignore_ascii_case("q") {
                break;
            }
            self.process(&line)?;
        }

        writeln!(self.output, "Final Blockchain:")?;
        writeln!(self.output, "{}", self.blockchain.render())?;
        self.output.flush()?;
        info!("会话结束，区块数量: {}", self.blockchain.len());
        Ok(self.blockchain)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        write!(self.output, "{}", PROMPT)?;
        self.output.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            debug!("输入结束");
            // 让最终输出从新的一行开始
            writeln!(self.output)?;
            return Ok(None);
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        // 非 UTF-8 字节替换为 U+FFFD, 会话继续
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }

    fn process(&mut self, data: &str) -> Result<()> {
        writeln!(self.output, "Hash (just data) = {}", to_hex(laboon_hash(data)))?;
        writeln!(self.output, "Mining..")?;

        let mut observer = ConsoleObserver {
            output: &mut self.output,
            show_attempts: self.show_attempts,
            error: None,
        };
        let block = self.blockchain.mine_block(data, &self.pow, &mut observer)?;
        if let Some(err) = observer.error {
            return Err(err.into());
        }

        writeln!(self.output, "Found nonce {}!", to_hex(block.nonce()))?;
        writeln!(self.output, "Final hash {}!", to_hex(block.hash()))?;
        Ok(())
    }
}

/// Writes mining progress to the session output. The first write failure
/// is kept and the rest of the search runs silently.
struct ConsoleObserver<'a, W> {
    output: &'a mut W,
    show_attempts: bool,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleObserver<'_, W> {
    fn write_line(&mut self, line: std::fmt::Arguments) {
        if self.error.is_none() {
            if let Err(e) = writeln!(self.output, "{}", line) {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> MiningObserver for ConsoleObserver<'_, W> {
    fn on_attempt(&mut self, _nonce: Nonce, candidate: &str, hash: Hash) {
        if self.show_attempts {
            self.write_line(format_args!("Trying: {}.. hash: {}", candidate, to_hex(hash)));
        }
    }

    fn on_exhausted(&mut self, difficulty: Difficulty) {
        self.write_line(format_args!(
            "Could not find nonce at difficulty {}, searching again",
            difficulty
        ));
    }
}
