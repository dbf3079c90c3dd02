use std::fmt;
use std::str::FromStr;

use tracing::{debug, error, info};

use crate::difficulty::{valid_hash, Difficulty};
use crate::error::{LaboonError, Result};
use crate::hash::{from_hex, laboon_hash, to_hex, to_hex_upper, Hash, Nonce};
use crate::pow::{MiningObserver, ProofOfWork};

const FIELD_SEPARATOR: char = '|';

/// Renders a block record: `data|PREV|NONCE|HASH`, with the three numeric
/// fields as eight uppercase hex digits.
///
/// `data` is written as is. A `|` inside it is not escaped.
pub fn create_block(data: &str, prev_hash: Hash, nonce: Nonce, hash: Hash) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}",
        data,
        to_hex_upper(prev_hash),
        to_hex_upper(nonce),
        to_hex_upper(hash),
        sep = FIELD_SEPARATOR
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    data: String,
    prev_hash: Hash,
    nonce: Nonce,
    hash: Hash,
}

impl Block {
    /// Builds a block for a nonce that is already known.
    pub fn new(data: impl Into<String>, prev_hash: Hash, nonce: Nonce) -> Block {
        let data = data.into();
        let hash = ProofOfWork::calculate_hash(&data, prev_hash, nonce);
        Block {
            data,
            prev_hash,
            nonce,
            hash,
        }
    }

    pub fn mine(
        data: impl Into<String>,
        prev_hash: Hash,
        pow: &ProofOfWork,
        observer: &mut dyn MiningObserver,
    ) -> Block {
        let data = data.into();
        debug!("创建新区块，前置哈希: {}, 数据哈希: {}", to_hex(prev_hash), to_hex(laboon_hash(&data)));
        let nonce = pow.run(&data, prev_hash, observer);
        let block = Block::new(data, prev_hash, nonce);
        info!("新区块创建成功，哈希: {}", to_hex(block.hash));
        block
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn prev_hash(&self) -> Hash {
        self.prev_hash
    }

    pub fn nonce(&self) -> Nonce {
        self.nonce
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn record(&self) -> String {
        create_block(&self.data, self.prev_hash, self.nonce, self.hash)
    }

    pub fn verify_hash(&self) -> bool {
        let calculated = ProofOfWork::calculate_hash(&self.data, self.prev_hash, self.nonce);
        if calculated != self.hash {
            error!(
                "区块哈希验证失败，存储的哈希: {}, 计算的哈希: {}",
                to_hex(self.hash),
                to_hex(calculated)
            );
            return false;
        }
        true
    }

    pub fn meets_difficulty(&self, difficulty: Difficulty) -> bool {
        valid_hash(difficulty.level(), self.hash)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.record())
    }
}

impl FromStr for Block {
    type Err = LaboonError;

    /// The three hex fields have a fixed width, so they are split off from
    /// the right and whatever remains is the data, pipes included.
    fn from_str(record: &str) -> Result<Self> {
        let mut fields = record.rsplitn(4, FIELD_SEPARATOR);
        let (hash, nonce, prev_hash, data) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(hash), Some(nonce), Some(prev_hash), Some(data)) => (hash, nonce, prev_hash, data),
            _ => {
                return Err(LaboonError::InvalidBlock(format!(
                    "区块记录字段不足: {:?}",
                    record
                )))
            }
        };

        let field = |name: &str, text: &str| {
            from_hex(text).map_err(|e| LaboonError::InvalidBlock(format!("{} 字段无效: {}", name, e)))
        };

        Ok(Block {
            data: data.to_string(),
            prev_hash: field("prev_hash", prev_hash)?,
            nonce: field("nonce", nonce)?,
            hash: field("hash", hash)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::GENESIS_HASH;
    use crate::pow::SilentObserver;

    #[test]
    fn test_create_block_formats() {
        assert_eq!(
            create_block("Lets go Pens", 0, 1746332, 951626),
            "Lets go Pens|00000000|001AA59C|000E854A"
        );
        assert_eq!(create_block("boo", 0, -1, 11), "boo|00000000|FFFFFFFF|0000000B");
        assert_eq!(create_block("", 0, -1, 11), "|00000000|FFFFFFFF|0000000B");
    }

    #[test]
    fn test_mined_block() -> Result<()> {
        let pow = ProofOfWork::new(Difficulty::new(2)?);
        let block = Block::mine("who", GENESIS_HASH, &pow, &mut SilentObserver);

        assert_eq!(block.data(), "who");
        assert_eq!(block.prev_hash(), GENESIS_HASH);
        assert_eq!(block.nonce(), 198);
        assert_eq!(block.hash(), 0x00A32E6F);
        assert_eq!(block.to_string(), "who|00000000|000000C6|00A32E6F");
        assert!(block.verify_hash());
        assert!(block.meets_difficulty(pow.difficulty()));
        Ok(())
    }

    #[test]
    fn test_parse_record() -> Result<()> {
        let block: Block = "what|050F1ADF|00000013|029CDAA8".parse()?;
        assert_eq!(block.data(), "what");
        assert_eq!(block.prev_hash(), 0x050F1ADF);
        assert_eq!(block.nonce(), 0x13);
        assert_eq!(block.hash(), 0x029CDAA8);
        assert!(block.verify_hash());
        assert_eq!(block.record(), "what|050F1ADF|00000013|029CDAA8");
        Ok(())
    }

    #[test]
    fn test_parse_keeps_pipes_in_data() -> Result<()> {
        let block = Block::new("a|b", GENESIS_HASH, 7);
        let parsed: Block = block.record().parse()?;
        assert_eq!(parsed.data(), "a|b");
        assert_eq!(parsed, block);

        let empty: Block = "|00000000|FFFFFFFF|0000000B".parse()?;
        assert_eq!(empty.data(), "");
        assert_eq!(empty.nonce(), -1);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("no fields".parse::<Block>(), Err(LaboonError::InvalidBlock(_))));
        assert!(matches!("x|00000000|1|00000000".parse::<Block>(), Err(LaboonError::InvalidBlock(_))));
        assert!(matches!("x|00000000|ZZZZZZZZ|00000000".parse::<Block>(), Err(LaboonError::InvalidBlock(_))));
    }

    #[test]
    fn test_tampered_block_fails_verification() -> Result<()> {
        let block: Block = "who|00000000|000000C6|00A32E6E".parse()?;
        assert!(!block.verify_hash());

        let block: Block = "Lets go Pens|00000000|001AA59C|000E854A".parse()?;
        assert!(!block.verify_hash());
        Ok(())
    }
}
