use autodb_types::{Car, Principal};

/// Predicate evaluated against every record during a full scan.
#[derive(Clone, Debug, PartialEq)]
pub enum CarFilter {
    /// Case-insensitive name equality.
    Name(String),
    /// Case-insensitive model equality.
    Model(String),
    /// Case-insensitive manufacturer equality.
    CompanyName(String),
    /// Exact owner identity.
    Owner(Principal),
    /// Inclusive price range; empty when `min > max`.
    PriceRange { min: f64, max: f64 },
    /// Exact price. A fractional value never matches a whole-unit price.
    Price(f64),
}

impl CarFilter {
    pub fn matches(&self, car: &Car) -> bool {
        match self {
            Self::Name(name) => eq_ignore_case(&car.name, name),
            Self::Model(model) => eq_ignore_case(&car.model, model),
            Self::CompanyName(company) => eq_ignore_case(&car.company_name, company),
            Self::Owner(owner) => car.is_owned_by(owner),
            Self::PriceRange { min, max } => (*min..=*max).contains(&(car.price as f64)),
            Self::Price(price) => car.price as f64 == *price,
        }
    }
}

// Full Unicode lowercasing, not just ASCII.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
