use backcast::registry;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let url = args.get(1).expect("Usage: backcast-inject <url>");

    let db_url = std::env::var("DB_URL").expect("Environment variable DB_URL not set");

    let db = backcast::db::connect(&db_url).await.expect("Unable to connect to database");

    let resource = registry::create(&db, url).await.expect("Unable to register resource");
    println!("{}", serde_json::to_string(&resource).expect("Unable to encode resource"));
}
