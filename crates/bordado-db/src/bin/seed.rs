//! # Seed Data Generator
//!
//! Populates the database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database path
//! cargo run -p bordado-db --bin seed
//!
//! # Specify a database path
//! cargo run -p bordado-db --bin seed -- --db ./data/bordado.db
//! ```
//!
//! Seeds a small embroidered-apparel catalog (polos, caps, hoodies with
//! per-color/per-size stock), two customizable garments and three coupons.

use std::env;
use std::process::ExitCode;

use chrono::{Duration, Utc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bordado_core::types::{ColorVariant, Coupon, DiscountType, Product, SizeStock};
use bordado_db::{Database, DbConfig};

const DEFAULT_DB_PATH: &str = "./data/bordado.db";

fn embroidered(
    id: &str,
    name: &str,
    base_price_cents: i64,
    discount_percent: u32,
    colors: &[(&str, &[(&str, i64)])],
) -> Product {
    Product::Embroidered {
        id: id.to_string(),
        name: name.to_string(),
        base_price_cents,
        discount_percent,
        variants: colors
            .iter()
            .map(|(color, sizes)| ColorVariant {
                color: color.to_string(),
                sizes: sizes
                    .iter()
                    .map(|(size, stock)| SizeStock {
                        size: size.to_string(),
                        stock: *stock,
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn demo_products() -> Vec<Product> {
    let standard = &[("S", 12_i64), ("M", 20), ("L", 15), ("XL", 6)][..];

    vec![
        embroidered(
            "polo-club",
            "Club Polo",
            8500,
            29,
            &[("Navy", standard), ("White", standard)],
        ),
        embroidered(
            "polo-heritage",
            "Heritage Polo",
            9200,
            0,
            &[("Bottle Green", standard)],
        ),
        embroidered(
            "hoodie-crest",
            "Crest Hoodie",
            12900,
            15,
            &[("Charcoal", standard), ("Burgundy", &[("M", 8), ("L", 4)])],
        ),
        embroidered(
            "cap-monogram",
            "Monogram Cap",
            3500,
            0,
            &[("Black", &[("One Size", 40)]), ("Sand", &[("One Size", 25)])],
        ),
        embroidered(
            "sweater-anchor",
            "Anchor Sweater",
            11000,
            10,
            &[("Navy", standard)],
        ),
        Product::Customizable {
            id: "tee-custom".to_string(),
            name: "Custom Tee".to_string(),
            base_price_cents: 4000,
            thread_color_1: "White".to_string(),
            thread_color_2: None,
            custom_text: None,
            custom_image: String::new(),
            variants: vec![ColorVariant {
                color: "Black".to_string(),
                sizes: vec![
                    SizeStock {
                        size: "M".to_string(),
                        stock: 0,
                    },
                    SizeStock {
                        size: "L".to_string(),
                        stock: 0,
                    },
                ],
            }],
        },
        Product::Customizable {
            id: "apron-custom".to_string(),
            name: "Custom Apron".to_string(),
            base_price_cents: 5200,
            thread_color_1: "Gold".to_string(),
            thread_color_2: None,
            custom_text: None,
            custom_image: String::new(),
            variants: vec![],
        },
    ]
}

fn demo_coupons() -> Vec<Coupon> {
    let now = Utc::now();
    vec![
        Coupon {
            code: "SUMMER10".to_string(),
            discount_type: DiscountType::Percentage,
            value: 10,
            min_order_cents: 20000,
            max_uses: 100,
            current_uses: 0,
            valid_from: now - Duration::days(7),
            valid_to: now + Duration::days(30),
            active: true,
        },
        Coupon {
            code: "WELCOME5".to_string(),
            discount_type: DiscountType::Fixed,
            value: 500,
            min_order_cents: 0,
            max_uses: 1000,
            current_uses: 0,
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(365),
            active: true,
        },
        Coupon {
            code: "VIP25".to_string(),
            discount_type: DiscountType::Percentage,
            value: 25,
            min_order_cents: 50000,
            max_uses: 10,
            current_uses: 0,
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(14),
            active: false,
        },
    ]
}

fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    for window in args.windows(2) {
        if window[0] == "--db" {
            return window[1].clone();
        }
    }
    DEFAULT_DB_PATH.to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path = parse_db_path();
    info!(path = %db_path, "seeding database");

    let db = match Database::new(DbConfig::new(&db_path)).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "failed to open database");
            return ExitCode::FAILURE;
        }
    };

    let catalog = db.catalog();
    let mut product_count = 0usize;
    for product in demo_products() {
        match catalog.insert(&product).await {
            Ok(()) => product_count += 1,
            Err(e) => error!(id = %product.id(), error = %e, "skipping product"),
        }
    }

    let coupons = db.coupons();
    let mut coupon_count = 0usize;
    for coupon in demo_coupons() {
        match coupons.insert(&coupon).await {
            Ok(()) => coupon_count += 1,
            Err(e) => error!(code = %coupon.code, error = %e, "skipping coupon"),
        }
    }

    info!(
        products = product_count,
        coupons = coupon_count,
        "seed complete"
    );
    db.close().await;

    ExitCode::SUCCESS
}
