//
//  asc-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # API Module
//!
//! Everything needed to talk to the App Store Connect REST API.
//!
//! ## Submodules
//!
//! - [`client`]: the authenticated HTTP client with retries and deadlines
//! - [`request`]: transport-neutral request descriptors and path templates
//! - [`retry`]: backoff policy
//! - [`common`]: the JSON:API response model and pagination
//! - [`fanout`]: bounded concurrent fan-out
//! - [`reports`]: gzip TSV report decoding
//! - [`debug`]: redacted request/response tracing

pub mod client;

pub mod common;

pub mod debug;

pub mod fanout;

pub mod reports;

pub mod request;

pub mod retry;

pub use client::{AscClient, RawResponse, DEFAULT_BASE_URL, KNOWN_HOSTS};

pub use common::*;

pub use fanout::{fan_out, DEFAULT_CONCURRENCY};

pub use reports::{decode_gzip_tsv, ReportTable};

pub use request::{fill_path_template, RequestDescriptor};

pub use retry::RetryPolicy;
