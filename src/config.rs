// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io::Read;

/// Per-game settings. Missing fields take their default values when loaded from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Starting time on each side's clock, in seconds. `None` plays without clocks.
    pub clock_seconds: Option<u32>,
}

impl GameConfig {
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<GameConfig> {
        serde_json::from_reader(reader)
    }

    pub fn untimed() -> GameConfig {
        GameConfig {
            clock_seconds: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> GameConfig {
        GameConfig {
            clock_seconds: Some(600),
        }
    }
}
