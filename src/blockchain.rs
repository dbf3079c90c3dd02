use std::fmt;

use tracing::{debug, error, info, warn};

use crate::block::Block;
use crate::difficulty::Difficulty;
use crate::error::{LaboonError, Result};
use crate::hash::{to_hex, Hash, GENESIS_HASH};
use crate::pow::{MiningObserver, ProofOfWork};

/// Append-only list of rendered block records.
///
/// `current_hash` follows the blocks added through [`Blockchain::add_block`]
/// and is the `prev_hash` the next mined block links to.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<String>,
    current_hash: Hash,
}

impl Blockchain {
    pub fn new() -> Self {
        debug!("创建新的区块链");
        Blockchain {
            blocks: Vec::new(),
            current_hash: GENESIS_HASH,
        }
    }

    /// Appends a record verbatim. Nothing is checked and `current_hash` is
    /// left alone.
    pub fn append(&mut self, record: impl Into<String>) {
        self.blocks.push(record.into());
    }

    pub fn add_block(&mut self, block: &Block) -> Result<()> {
        debug!("开始添加新区块, 前置哈希: {}", to_hex(block.prev_hash()));

        if block.prev_hash() != self.current_hash {
            error!(
                "区块的前置哈希 {} 与当前哈希 {} 不匹配",
                to_hex(block.prev_hash()),
                to_hex(self.current_hash)
            );
            return Err(LaboonError::InvalidBlock(format!(
                "区块的前置哈希 {} 与当前哈希 {} 不匹配",
                to_hex(block.prev_hash()),
                to_hex(self.current_hash)
            )));
        }

        self.current_hash = block.hash();
        self.blocks.push(block.record());
        info!("成功添加新区块，当前区块链长度: {}", self.blocks.len());

        Ok(())
    }

    /// Mines `data` on top of the current tip and appends it.
    pub fn mine_block(
        &mut self,
        data: &str,
        pow: &ProofOfWork,
        observer: &mut dyn MiningObserver,
    ) -> Result<Block> {
        let block = Block::mine(data, self.current_hash, pow, observer);
        self.add_block(&block)?;
        Ok(block)
    }

    pub fn last_hash(&self) -> Hash {
        self.current_hash
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Every record followed by a newline; empty for an empty chain.
    pub fn render(&self) -> String {
        self.blocks.iter().fold(String::new(), |mut out, record| {
            out.push_str(record);
            out.push('\n');
            out
        })
    }

    /// Re-parses every record and checks the links, the stored hashes and
    /// the difficulty. Records that do not parse are an error.
    pub fn validate_chain(&self, difficulty: Difficulty) -> Result<bool> {
        info!("开始验证区块链");
        if self.blocks.is_empty() {
            warn!("区块链为空，验证通过");
            return Ok(true);
        }

        let mut prev_hash = GENESIS_HASH;
        for (i, record) in self.blocks.iter().enumerate() {
            debug!("验证第 {} 个区块", i + 1);
            let block: Block = record.parse().map_err(|e| {
                LaboonError::InvalidChain(format!("第 {} 个区块无法解析: {}", i + 1, e))
            })?;

            if block.prev_hash() != prev_hash {
                error!("区块 {} 的前置哈希不匹配", i + 1);
                return Ok(false);
            }

            if !block.verify_hash() {
                error!("区块 {} 哈希验证失败", i + 1);
                return Ok(false);
            }

            if !block.meets_difficulty(difficulty) {
                error!("区块 {} 的哈希未达到难度 {}", i + 1, difficulty);
                return Ok(false);
            }

            prev_hash = block.hash();
        }

        info!("区块链验证完成，验证通过");
        Ok(true)
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render())
    }
}
