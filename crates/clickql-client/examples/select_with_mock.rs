use clickql_client::{logging, Config, Connection, MockDriver};
use clickql_ir::Query;

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    config.apply_logging_env();
    if let Err(e) = logging::init() {
        eprintln!("Error: {}", e);
        return;
    }

    let driver = MockDriver::new();
    let conn = Connection::new(config.connection, driver);
    let query = Query::table("analytics")
        .filter("status", "=", 200)
        .where_month("ts", "03");

    match conn.select(&query) {
        Ok(rows) => println!("{} rows", rows.len()),
        Err(e) => println!("Error: {}", e),
    }
    println!("{:?}", conn.driver().calls());
}
