//! NSF Scholar
//!
//! Links NSF award records to Google Scholar author profiles and their
//! publications, as a chain of three restartable batch stages that hand off
//! through CSV tables in a database directory.
//!
//! # Stages
//!
//! - **Awards**: yearly folders of award XML → `funding_info.csv`
//! - **Authors**: principal investigators of one award year → matched profiles
//!   with citation metrics, `author_info/author_info_{year}.csv`
//! - **Publications**: each author's works around the award year with their
//!   bibliographic details, `publication_info/pub_info_{year}.csv`
//!
//! # Example
//!
//! ```no_run
//! use nsf_scholar::{ClientLauncher, Config, Paths, stages};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let paths = Paths::default();
//!
//!     let done = stages::authors::run(&config, &paths, ClientLauncher::new(config.clone()), 2015, None).await?;
//!     println!("{done}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod scrape;
pub mod stages;
pub mod tables;
pub mod xml;

pub use client::{Browser, ClientLauncher, Launcher, RecyclePolicy, ScholarClient, Session};
pub use config::{Config, Paths};
pub use error::{ClientError, PipelineError, ScrapeError};
