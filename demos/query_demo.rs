// Demonstration of the query operators
//
// Walks a small order list through filtering, projection, grouping,
// aggregation, ordering and in-place mutation.
//
// Run with compile logging:
//   RUST_LOG=linq_core=debug cargo run --example query_demo

use linq_core::{compile, Sequence};
use tracing_subscriber::EnvFilter;

const ORDERS: &str = r#"[
    {"id": 1, "customer": "Ada",   "region": "north", "total": 120.0, "items": ["lamp", "desk"]},
    {"id": 2, "customer": "Alan",  "region": "south", "total": 35.5,  "items": ["pen"]},
    {"id": 3, "customer": "Grace", "region": "north", "total": 410.0, "items": ["chair", "desk", "rug"]},
    {"id": 4, "customer": "Edsger","region": "east",  "total": 35.5,  "items": []},
    {"id": 5, "customer": "Barbara","region": "south", "total": 89.9, "items": ["lamp"]}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Query Operator Demo ===\n");

    let mut orders = Sequence::from_json_str(ORDERS)?;

    demo_filtering(&orders)?;
    demo_grouping(&orders)?;
    demo_aggregates(&orders)?;
    demo_ordering(&orders)?;
    demo_mutation(&mut orders)?;
    demo_errors(&orders);

    Ok(())
}

fn demo_filtering(orders: &Sequence) -> linq_core::Result<()> {
    println!("--- Filtering and projection ---");

    let big = orders.where_("o => o.total > 100")?;
    println!("orders over 100: {}", big.select("o => o.customer")?.to_json_string().unwrap_or_default());

    let first_south = orders.first("o => o.region == 'south'")?;
    println!("first south order: {:?}", first_south.map(|o| o.to_string()));

    let all_items = orders.select_many("o => o.items")?.distinct();
    println!("distinct items: {}", all_items.to_json_string().unwrap_or_default());
    println!();
    Ok(())
}

fn demo_grouping(orders: &Sequence) -> linq_core::Result<()> {
    println!("--- Grouping ---");
    for group in orders.group("o => o.region")? {
        println!(
            "{:>6}: {} order(s), total {}",
            group.key(),
            group.len(),
            group.sum("o => o.total")?
        );
    }
    println!();
    Ok(())
}

fn demo_aggregates(orders: &Sequence) -> linq_core::Result<()> {
    println!("--- Aggregates ---");
    println!("sum: {}", orders.sum("o => o.total")?);
    println!("avg: {:.2}", orders.avg("o => o.total")?);
    println!("max: {}", orders.max("o => o.total")?);
    println!("min customer: {}", orders.min("o => o.customer")?);
    println!("any empty: {}", orders.any("o => o.items.length == 0")?);
    println!();
    Ok(())
}

fn demo_ordering(orders: &Sequence) -> linq_core::Result<()> {
    println!("--- Ordering (stable) ---");
    let by_total = compile("o => o.total")?;
    let ids = orders.order_by(&by_total)?.select("o => o.id")?;
    println!("ascending ids:  {:?}", ids.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    let ids = orders.order_by_desc(&by_total)?.select("o => o.id")?;
    println!("descending ids: {:?}", ids.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    println!();
    Ok(())
}

fn demo_mutation(orders: &mut Sequence) -> linq_core::Result<()> {
    println!("--- Mutation ---");
    if let Some(index) = orders.find_index("o => o.customer == 'Alan'")? {
        let removed = orders.remove_at(index)?;
        println!("removed order {}", removed.get("id").map(|v| v.to_string()).unwrap_or_default());
    }
    if let Some(target) = orders.last("o => o.region == 'north'")? {
        orders.remove_element(&target);
    }
    println!("{} orders left", orders.len());
    println!();
    Ok(())
}

fn demo_errors(orders: &Sequence) {
    println!("--- Errors ---");
    for source in ["o.total > 1", "o => o.total >", "o => total > 1", "o => o.items.length.x.y"] {
        match orders.where_(source) {
            Ok(found) => println!("{source:<26} -> {} match(es)", found.len()),
            Err(e) => println!("{source:<26} -> {e}"),
        }
    }
}
