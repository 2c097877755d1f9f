use prospekt_core::{BlockingClient, Catalog};

const ROOT_URL: &str = "https://www.prospektmaschine.de/hypermarkte/";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = BlockingClient::new()?;

    println!("Searching categories on {ROOT_URL}\n");
    let mut catalog = Catalog::discover(ROOT_URL, &client)?;

    for endpoint in catalog.endpoints() {
        println!("  • {} ({})", endpoint.shop_name, endpoint.url);
    }

    // Fetch one shop on demand first, then the rest
    let first = catalog.endpoints().next().map(|e| e.shop_name.clone());
    if let Some(first) = first {
        let category = catalog.get_category(&first, &client)?;
        println!("\n{category}: {} tiles", category.tile_count());
    }

    let mut total = 0;
    for category in catalog.categories(&client) {
        let category = category?;
        for prospect in category.records() {
            println!(
                "  {} | {} | {} - {}",
                prospect.shop_name, prospect.title, prospect.valid_from, prospect.valid_to
            );
            total += 1;
        }
    }

    println!("\n{catalog}");
    println!("Total {total} prospects.");

    Ok(())
}
