use clickql_grammar::Grammar;
use clickql_ir::{Query, Record};

fn main() {
    let query = Query::table("analytics")
        .filter("name", "=", "page_view")
        .where_month("ts", "03");
    let assignments = Record::new().with("name", "page_visit");

    match Grammar::new().compile_update(&query, &assignments) {
        Ok(statement) => {
            println!("{}", statement.sql);
            println!("{}", statement.parameters.to_json());
        }
        Err(e) => println!("Error: {}", e),
    }
}
