//! Fake value producer - 합성 모드용 테스트 데이터 생성
//!
//! 필드 이름으로 의미 범주(email, price, sku ...)를 추정하고,
//! 범주와 선언 타입에 맞는 그럴듯한 값을 만든다.

use crate::schema::FieldType;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Number, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Semantic category of a schema field, inferred from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Email,
    FirstName,
    LastName,
    FullName,
    /// Product-style title ("name", "title")
    Title,
    Description,
    Category,
    Phone,
    Address,
    Price,
    Quantity,
    Sku,
    /// No semantic hint; value chosen by declared type only
    Generic,
}

impl FieldCategory {
    /// Infer the category from a field name and its declared type.
    pub fn classify(field_name: &str, field_type: FieldType) -> Self {
        if field_type == FieldType::Address {
            return FieldCategory::Address;
        }

        let key: String = field_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "firstname" | "givenname" | "fname" => return FieldCategory::FirstName,
            "lastname" | "surname" | "familyname" | "lname" => return FieldCategory::LastName,
            "fullname" | "customername" | "contactname" => return FieldCategory::FullName,
            "name" | "title" | "productname" => return FieldCategory::Title,
            _ => {}
        }

        const RULES: &[(&[&str], FieldCategory)] = &[
            (&["email"], FieldCategory::Email),
            (&["sku"], FieldCategory::Sku),
            (&["phone", "mobile"], FieldCategory::Phone),
            (&["address", "street"], FieldCategory::Address),
            (&["price", "cost", "amount"], FieldCategory::Price),
            (&["quantity", "qty", "stock", "count"], FieldCategory::Quantity),
            (&["description", "summary", "details"], FieldCategory::Description),
            (&["category"], FieldCategory::Category),
        ];

        RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| key.contains(n)))
            .map(|(_, category)| *category)
            .unwrap_or(FieldCategory::Generic)
    }
}

/// Capability that yields a plausible value for a field.
///
/// Must be total over the declared type tags: every `(category, field_type)`
/// pair yields some value. The resolver re-validates the value against the
/// declared type.
pub trait FakeValueProducer: Send + Sync {
    fn produce(&self, category: FieldCategory, field_type: FieldType) -> Value;
}

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Jackson",
    "Martin", "Lee", "Thompson", "White", "Harris", "Clark",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "test.local"];

const STREET_NAMES: &[&str] = &[
    "Oak", "Maple", "Cedar", "Pine", "Elm", "Washington", "Lake", "Hill", "Park", "Main",
    "Sunset", "River",
];

const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Blvd", "Rd", "Ln", "Dr", "Ct", "Way"];

const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Riverside", "CA"),
    ("Franklin", "TN"),
    ("Greenville", "SC"),
    ("Madison", "WI"),
    ("Salem", "OR"),
    ("Georgetown", "TX"),
    ("Clinton", "NY"),
    ("Fairview", "NJ"),
    ("Bristol", "CT"),
];

const ADJECTIVES: &[&str] = &[
    "Ergonomic", "Intuitive", "Robust", "Seamless", "Compact", "Advanced", "Versatile",
    "Streamlined", "Reliable", "Smart", "Portable", "Premium",
];

const QUALITIES: &[&str] = &[
    "wireless", "modular", "high-performance", "eco-friendly", "next-generation", "durable",
    "zero-defect", "multi-layered", "adaptive", "user-centric",
];

const NOUNS: &[&str] = &[
    "hub", "monitor", "keyboard", "backpack", "speaker", "lamp", "chair", "headset", "router",
    "bottle", "notebook", "charger", "camera", "blender",
];

const CATEGORIES: &[&str] = &[
    "electronics", "clothing", "books", "home", "garden", "toys", "sports", "beauty", "grocery",
    "automotive",
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "dolore", "magna", "aliqua", "enim", "minim",
    "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris",
];

/// `rand`-backed producer
///
/// Emails are unique for the lifetime of the producer.
pub struct RandomFaker {
    rng: Mutex<StdRng>,
    sequence: AtomicU64,
}

impl RandomFaker {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            sequence: AtomicU64::new(1),
        }
    }

    /// Deterministic producer for reproducible data sets
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            sequence: AtomicU64::new(1),
        }
    }

    fn pick(rng: &mut StdRng, items: &[&'static str]) -> &'static str {
        items.choose(rng).copied().unwrap_or_default()
    }

    fn email(&self, rng: &mut StdRng) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}.{}{}@{}",
            Self::pick(rng, FIRST_NAMES).to_ascii_lowercase(),
            Self::pick(rng, LAST_NAMES).to_ascii_lowercase(),
            n,
            Self::pick(rng, EMAIL_DOMAINS)
        )
    }

    fn address(rng: &mut StdRng) -> String {
        let (city, state) = CITIES.choose(rng).copied().unwrap_or(("Springfield", "IL"));
        format!(
            "{} {} {}, {}, {} {:05}",
            rng.gen_range(1..=9999),
            Self::pick(rng, STREET_NAMES),
            Self::pick(rng, STREET_SUFFIXES),
            city,
            state,
            rng.gen_range(10000..=99999)
        )
    }

    fn phone(rng: &mut StdRng) -> String {
        format!(
            "({:03}) {:03}-{:04}",
            rng.gen_range(200..=999),
            rng.gen_range(200..=999),
            rng.gen_range(0..=9999)
        )
    }

    fn title(rng: &mut StdRng) -> String {
        format!(
            "{} {} {}",
            Self::pick(rng, ADJECTIVES),
            Self::pick(rng, QUALITIES),
            Self::pick(rng, NOUNS)
        )
    }

    fn paragraph(rng: &mut StdRng) -> String {
        let sentences = rng.gen_range(2..=4);
        (0..sentences)
            .map(|_| {
                let words = rng.gen_range(5..=10);
                let mut sentence = (0..words)
                    .map(|_| Self::pick(rng, LOREM))
                    .collect::<Vec<_>>()
                    .join(" ");
                if let Some(first) = sentence.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                sentence.push('.');
                sentence
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn sku(rng: &mut StdRng) -> String {
        let prefix: String = (0..3)
            .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
            .collect();
        format!("{}-{:06}", prefix, rng.gen_range(0..1_000_000))
    }

    /// Price with two decimals in [1.00, 99.99]
    fn price(rng: &mut StdRng) -> Value {
        let cents: u32 = rng.gen_range(100..=9_999);
        Number::from_f64(f64::from(cents) / 100.0)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(1))
    }

    fn string_for(&self, category: FieldCategory, rng: &mut StdRng) -> String {
        match category {
            FieldCategory::Email => self.email(rng),
            FieldCategory::FirstName => Self::pick(rng, FIRST_NAMES).to_string(),
            FieldCategory::LastName => Self::pick(rng, LAST_NAMES).to_string(),
            FieldCategory::FullName => format!(
                "{} {}",
                Self::pick(rng, FIRST_NAMES),
                Self::pick(rng, LAST_NAMES)
            ),
            FieldCategory::Title => Self::title(rng),
            FieldCategory::Description => Self::paragraph(rng),
            FieldCategory::Category => Self::pick(rng, CATEGORIES).to_string(),
            FieldCategory::Phone => Self::phone(rng),
            FieldCategory::Address => Self::address(rng),
            FieldCategory::Sku => Self::sku(rng),
            FieldCategory::Price
            | FieldCategory::Quantity
            | FieldCategory::Generic => Self::pick(rng, LOREM).to_string(),
        }
    }
}

impl Default for RandomFaker {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeValueProducer for RandomFaker {
    fn produce(&self, category: FieldCategory, field_type: FieldType) -> Value {
        let mut rng = self.rng.lock();
        match field_type {
            FieldType::Float => match category {
                FieldCategory::Quantity => Value::from(rng.gen_range(0..=1000)),
                _ => Self::price(&mut rng),
            },
            FieldType::Integer => match category {
                FieldCategory::Price => Value::from(rng.gen_range(1..=999)),
                _ => Value::from(rng.gen_range(0..=1000)),
            },
            FieldType::Address => Value::String(Self::address(&mut rng)),
            FieldType::String => match category {
                FieldCategory::Price => Self::price(&mut rng),
                FieldCategory::Quantity => Value::from(rng.gen_range(0..=1000)),
                _ => Value::String(self.string_for(category, &mut rng)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;
    use std::collections::HashSet;

    #[test]
    fn test_classify_by_name() {
        assert_eq!(
            FieldCategory::classify("email", FieldType::String),
            FieldCategory::Email
        );
        assert_eq!(
            FieldCategory::classify("contactEmail", FieldType::String),
            FieldCategory::Email
        );
        assert_eq!(
            FieldCategory::classify("firstName", FieldType::String),
            FieldCategory::FirstName
        );
        assert_eq!(
            FieldCategory::classify("last_name", FieldType::String),
            FieldCategory::LastName
        );
        assert_eq!(
            FieldCategory::classify("phoneNumber", FieldType::String),
            FieldCategory::Phone
        );
        assert_eq!(
            FieldCategory::classify("unitPrice", FieldType::Float),
            FieldCategory::Price
        );
        assert_eq!(
            FieldCategory::classify("stockQuantity", FieldType::Integer),
            FieldCategory::Quantity
        );
        assert_eq!(
            FieldCategory::classify("SKU", FieldType::String),
            FieldCategory::Sku
        );
        assert_eq!(
            FieldCategory::classify("shipping", FieldType::Address),
            FieldCategory::Address
        );
        assert_eq!(
            FieldCategory::classify("color", FieldType::String),
            FieldCategory::Generic
        );
    }

    #[test]
    fn test_values_match_declared_type() {
        let faker = RandomFaker::seeded(7);
        let categories = [
            FieldCategory::Email,
            FieldCategory::FirstName,
            FieldCategory::Title,
            FieldCategory::Description,
            FieldCategory::Phone,
            FieldCategory::Address,
            FieldCategory::Price,
            FieldCategory::Quantity,
            FieldCategory::Sku,
            FieldCategory::Generic,
        ];

        for category in categories {
            for field_type in FieldType::ALL {
                let value = faker.produce(category, field_type);
                assert!(
                    validate(field_type, &value).is_ok(),
                    "{:?}/{:?} produced {}",
                    category,
                    field_type,
                    value
                );
            }
        }
    }

    #[test]
    fn test_semantic_shapes() {
        let faker = RandomFaker::seeded(42);

        let email = faker.produce(FieldCategory::Email, FieldType::String);
        assert!(email.as_str().unwrap().contains('@'));

        let price = faker.produce(FieldCategory::Price, FieldType::Float);
        assert!(price.as_f64().unwrap() > 0.0);

        let sku = faker.produce(FieldCategory::Sku, FieldType::String);
        let sku = sku.as_str().unwrap();
        assert!(sku.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));

        let quantity = faker.produce(FieldCategory::Quantity, FieldType::Integer);
        assert!(quantity.is_i64());
    }

    #[test]
    fn test_emails_are_unique() {
        let faker = RandomFaker::seeded(1);
        let emails: HashSet<String> = (0..200)
            .map(|_| {
                faker
                    .produce(FieldCategory::Email, FieldType::String)
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(emails.len(), 200);
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let a = RandomFaker::seeded(99);
        let b = RandomFaker::seeded(99);
        assert_eq!(
            a.produce(FieldCategory::Title, FieldType::String),
            b.produce(FieldCategory::Title, FieldType::String)
        );
    }
}
