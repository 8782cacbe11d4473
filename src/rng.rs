// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;

use rand::{thread_rng, Rng as _, SeedableRng};
use rand_chacha::ChaCha20Rng;
use uuid::Uuid;

thread_local! {
    // LINT: We need a working random number generator for the program to
    // function.
    #[allow(clippy::expect_used)]
    static RNG: RefCell<ChaCha20Rng> = RefCell::new(ChaCha20Rng::from_rng(thread_rng()).expect("random number generator failed to initialize"));
}

pub(crate) fn map<F, R>(mut f: F) -> R
where
    F: FnMut(&mut ChaCha20Rng) -> R,
{
    RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// Generates a fresh random (version 4) identifier.
pub(crate) fn identifier() -> Uuid {
    map(|rng| uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_random_v4() {
        let first = identifier();
        let second = identifier();

        assert_eq!(first.get_version_num(), 4);
        assert_ne!(first, second);
    }
}
