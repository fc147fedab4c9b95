// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod batcher_query;
pub mod commitment;
pub mod estimate_fee;
pub mod stress;
