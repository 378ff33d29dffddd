//! Random passenger data for the purchase form

use chrono::Datelike;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const CARD_TYPES: [&str; 3] = ["Visa", "American Express", "Diner's Club"];

/// Fabricated passenger profile. Never validated by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub card_type: String,
    pub card_number: String,
    pub card_month: u32,
    pub card_year: i32,
    pub name_on_card: String,
}

impl Passenger {
    /// Fresh profile from the thread-local generator
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    /// Reproducible profile for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::generate(&mut StdRng::seed_from_u64(seed))
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let name = format!("{} {}", word(rng, 6), word(rng, 8));
        let house = rng.gen_range(1..=9999);
        let card_type = CARD_TYPES[rng.gen_range(0..CARD_TYPES.len())];
        let this_year = chrono::Utc::now().year();

        Self {
            address: format!("{} {} Street", house, word(rng, 6)),
            city: word(rng, 5),
            state: word(rng, 4),
            zip_code: digits(rng, 5),
            card_type: card_type.to_string(),
            card_number: card_number(rng),
            card_month: rng.gen_range(1..=12),
            card_year: this_year + rng.gen_range(1..=5),
            name_on_card: name.clone(),
            name,
        }
    }
}

/// Capitalized run of ASCII letters
fn word<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let letters = Uniform::new_inclusive(b'a', b'z');
    let mut word: String = (0..len).map(|_| rng.sample(letters) as char).collect();
    if let Some(first) = word.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    word
}

fn digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// 16-digit number with a valid Luhn check digit
fn card_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut number = String::with_capacity(16);
    number.push('4');
    number.push_str(&digits(rng, 14));
    number.push(char::from(b'0' + luhn_check_digit(&number)));
    number
}

fn luhn_check_digit(payload: &str) -> u8 {
    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}
