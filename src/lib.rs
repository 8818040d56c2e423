//! # kinopoisk-imdb
//!
//! Reconciles a Kinopoisk watch-history export with the IMDb title catalog
//! and writes a CSV in the Letterboxd import format.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │  download    │──▶│   catalog    │──▶│    resolve    │
//! │ (cache, 1d)  │   │ title index  │   │ title + year  │
//! └──────────────┘   └──────────────┘   └───────┬───────┘
//!                                               │
//! ┌──────────────┐   ┌──────────────┐   ┌───────▼───────┐
//! │   source     │──▶│    enrich    │──▶│    export     │
//! │ HTML export  │   │  attach ids  │   │  CSV (UTF-8)  │
//! └──────────────┘   └──────────────┘   └───────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and defaults |
//! | [`models`] | Catalog entries and watch records |
//! | [`error`] | Error types |
//! | [`download`] | Catalog cache freshness and download |
//! | [`catalog`] | Streaming catalog loader and title index |
//! | [`resolve`] | Title disambiguation |
//! | [`source`] | HTML export parser |
//! | [`enrich`] | Identifier attachment |
//! | [`export`] | CSV writer |
//! | [`pipeline`] | One full run |

pub mod catalog;
pub mod config;
pub mod download;
pub mod enrich;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod resolve;
pub mod source;
