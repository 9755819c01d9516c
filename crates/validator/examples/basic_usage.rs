//! Basic usage example for fieldguard

use fieldguard::{Engine, NameResolver, Record, Value, Violation, evaluator};

#[derive(Debug, Record)]
struct Address {
    #[validate("required")]
    pub city: String,
    #[validate("required, len(5), numeric")]
    #[tag(json = "postalCode")]
    pub zip: String,
}

#[derive(Debug, Record)]
struct Signup {
    #[validate("required, alphadash, between(3, 20)")]
    pub username: String,
    #[validate("required, email")]
    pub email: String,
    #[validate("min(13)")]
    pub age: u8,
    #[validate("-")]
    pub referrer: Option<String>,
    pub addresses: Vec<Address>,
}

fn main() -> fieldguard::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let signup = Signup {
        username: "ada lovelace".into(),
        email: "ada@example".into(),
        age: 36,
        referrer: None,
        addresses: vec![
            Address {
                city: "London".into(),
                zip: "10001".into(),
            },
            Address {
                city: String::new(),
                zip: "W1".into(),
            },
        ],
    };

    // Default engine, field names as written
    match fieldguard::validate(&signup) {
        Ok(()) => println!("✓ signup is valid"),
        Err(e) => println!("✗ signup is invalid: {e}"),
    }

    // JSON names in paths, plus a custom constraint
    let engine = Engine::builder()
        .name_resolver(NameResolver::json())
        .validator(
            "even",
            evaluator(|value, _| match value {
                Value::Integer(n) if n % 2 == 0 => Ok(()),
                _ => Err(Violation::custom("even", "must be even")),
            }),
        )
        .build()?;

    let report = engine.report(&signup)?;
    for (path, violations) in &report {
        for violation in violations {
            println!("  {path}: {violation} ({})", violation.kind().code());
        }
    }

    // Bare values
    println!("even(7): {:?}", engine.valid(&7_i64, "even").map_err(|e| e.to_string()));
    println!("uuid4: {}", engine.valid("not-a-uuid", "uuid4").is_ok());

    Ok(())
}
