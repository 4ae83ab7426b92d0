//  Copyright 2024 MrCroxx
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use rand::rngs::SmallRng;

use super::Generator;

/// A trivial numeric generator that always returns the same value.
#[derive(Debug)]
pub struct ConstantGenerator {
    val: u64,
}

impl ConstantGenerator {
    /// Creates a trivial numeric generator that always returns the same value.
    pub fn new(val: u64) -> Self {
        Self { val }
    }
}

impl Generator for ConstantGenerator {
    type Output = u64;

    fn next(&mut self, _: &mut SmallRng) -> Self::Output {
        self.val
    }

    fn last(&self) -> Self::Output {
        self.val
    }
}
