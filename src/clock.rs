// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

/// A countdown clock for one side, in whole seconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Clock {
    initial: u32,
    remaining: u32,
}

impl Clock {
    pub fn new(seconds: u32) -> Clock {
        Clock {
            initial: seconds,
            remaining: seconds,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Charges `seconds` against the clock. Returns true if this tick made the clock run out.
    pub fn tick(&mut self, seconds: u32) -> bool {
        if self.is_expired() {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(seconds);
        self.is_expired()
    }

    pub fn reset(&mut self) {
        self.remaining = self.initial;
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
