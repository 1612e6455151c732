use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use skyrank_core::SearchCriteria;

use crate::models::{Baggage, CabinClass, FlightOffer};

pub const AIRLINES: [&str; 10] = [
    "Air France",
    "El Al",
    "Lufthansa",
    "Emirates",
    "British Airways",
    "Turkish Airlines",
    "KLM",
    "Ryanair",
    "EasyJet",
    "Wizz Air",
];

pub const AMENITIES: [&str; 9] = [
    "Free WiFi",
    "In-flight entertainment",
    "Power outlet",
    "USB charging",
    "Meals included",
    "Free snacks",
    "Drinks included",
    "Extra legroom",
    "Reclining seat",
];

pub const MIN_OFFERS: usize = 8;
pub const MAX_OFFERS: usize = 15;

const STOP_WEIGHTS: [u32; 3] = [50, 35, 15];
const CABIN_WEIGHTS: [u32; 4] = [3, 1, 1, 1];
const QUARTER_HOURS: [u32; 4] = [0, 15, 30, 45];
const FALLBACK_DATE_OFFSET_DAYS: i64 = 30;

/// Synthesizes flight offers for a search. There is no inventory behind it.
pub struct OfferGenerator {
    stops: WeightedIndex<u32>,
    cabins: WeightedIndex<u32>,
    currency: String,
}

impl OfferGenerator {
    pub fn new() -> Self {
        Self {
            // Weights are non-empty constants with a positive sum
            stops: WeightedIndex::new(STOP_WEIGHTS).expect("valid stop weights"),
            cabins: WeightedIndex::new(CABIN_WEIGHTS).expect("valid cabin weights"),
            currency: "EUR".to_string(),
        }
    }

    /// Generate a batch using the thread-local random source
    pub fn generate(&self, criteria: &SearchCriteria) -> Vec<FlightOffer> {
        self.generate_with_rng(criteria, &mut rand::thread_rng())
    }

    /// Generate a batch of 8 to 15 offers, sorted ascending by price.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        criteria: &SearchCriteria,
        rng: &mut R,
    ) -> Vec<FlightOffer> {
        let departure_date = parse_departure_date(&criteria.date);
        let pool = airline_pool(criteria.preferred_airline(), rng);
        let count = rng.gen_range(MIN_OFFERS..=MAX_OFFERS);

        let mut offers: Vec<FlightOffer> = (0..count)
            .map(|i| {
                // The preferred airline, when given, heads the pool and
                // always flies the first offer.
                let airline = if i == 0 && criteria.preferred_airline().is_some() {
                    pool[0].clone()
                } else {
                    pool.choose(rng).cloned().unwrap_or_else(|| pool[0].clone())
                };
                self.create_offer(i, airline, departure_date, criteria, rng)
            })
            .collect();

        offers.sort_by_key(|o| o.price);
        offers
    }

    fn create_offer<R: Rng + ?Sized>(
        &self,
        index: usize,
        airline: String,
        departure_date: NaiveDate,
        criteria: &SearchCriteria,
        rng: &mut R,
    ) -> FlightOffer {
        let departure_time = departure_date
            .and_hms_opt(rng.gen_range(0..24), *pick(&QUARTER_HOURS, rng), 0)
            .unwrap_or_else(|| departure_date.and_time(NaiveTime::default()));

        let hours: u32 = rng.gen_range(2..=15);
        let minutes = *pick(&QUARTER_HOURS, rng);
        let duration_minutes = hours * 60 + minutes;
        let arrival_time: NaiveDateTime =
            departure_time + Duration::minutes(duration_minutes as i64);

        let base_price: u32 = rng.gen_range(150..=1200);
        let stops = self.stops.sample(rng) as u8;
        let cabin_class = CabinClass::ALL[self.cabins.sample(rng)];

        let serial = 1000 + index;
        FlightOffer {
            id: format!("FL{}", serial),
            flight_number: format!("{}{}", airline_prefix(&airline), rng.gen_range(100..=999)),
            airline,
            origin: criteria.origin.clone(),
            destination: criteria.destination.clone(),
            departure_time,
            arrival_time,
            duration: format!("{}h {}m", hours, minutes),
            duration_minutes,
            price: cabin_class.apply_to(base_price),
            currency: self.currency.clone(),
            stops,
            cabin_class,
            available_seats: rng.gen_range(1..=150),
            baggage: Baggage {
                carry_on: 1,
                checked: rng.gen_range(0..=2),
            },
            amenities: pick_amenities(rng),
            booking_url: format!("https://booking.example.com/flight/{}", serial),
        }
    }
}

impl Default for OfferGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `YYYY-MM-DD`, falling back to 30 days from now.
pub fn parse_departure_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").unwrap_or_else(|_| {
        let fallback = (Utc::now() + Duration::days(FALLBACK_DATE_OFFSET_DAYS)).date_naive();
        tracing::debug!(date, %fallback, "unparseable search date, using default");
        fallback
    })
}

fn airline_pool<R: Rng + ?Sized>(preferred: Option<&str>, rng: &mut R) -> Vec<String> {
    match preferred {
        Some(preferred) => {
            let others: Vec<&str> = AIRLINES
                .iter()
                .copied()
                .filter(|a| !a.eq_ignore_ascii_case(preferred))
                .collect();
            std::iter::once(preferred.to_string())
                .chain(others.choose_multiple(rng, 4).map(|a| a.to_string()))
                .collect()
        }
        None => AIRLINES.iter().map(|a| a.to_string()).collect(),
    }
}

fn pick_amenities<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let n = rng.gen_range(3..=7);
    AMENITIES
        .choose_multiple(rng, n)
        .map(|a| a.to_string())
        .collect()
}

fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// First two letters of the airline name, uppercased
fn airline_prefix(airline: &str) -> String {
    let prefix: String = airline
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(2)
        .collect::<String>()
        .to_uppercase();
    if prefix.is_empty() {
        "XX".to_string()
    } else {
        prefix
    }
}
