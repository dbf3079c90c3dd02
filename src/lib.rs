// 导出所有模块
pub mod block;
pub mod blockchain;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod pow;
pub mod repl;

// 导出常用类型
pub use block::{create_block, Block};
pub use blockchain::Blockchain;
pub use config::Config;
pub use difficulty::{valid_hash, Difficulty, DifficultyFallback};
pub use error::{LaboonError, Result};
pub use hash::{laboon_hash, Hash, Nonce, GENESIS_HASH};
pub use pow::{MiningObserver, ProofOfWork, SilentObserver};
pub use repl::Session;
