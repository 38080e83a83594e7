// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;

use tracing::info;

mod error;
mod search;

pub use error::ConfigError;
pub use search::SearchConfig;

/// Loads the search configuration from the given file, or the defaults if there is none.
pub fn load_search_config(path: Option<&Path>) -> Result<SearchConfig, ConfigError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading search config");
            SearchConfig::deserialize(path)
        }
        None => Ok(SearchConfig::default()),
    }
}
