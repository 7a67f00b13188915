use tabuladb::demo::sales_data;
use tabuladb::Session;

fn main() -> anyhow::Result<()> {
    let mut session = Session::new();
    session.register("data", sales_data()?)?;

    let result = session.execute("SELECT category, SUM(value) AS sum_value FROM data GROUP BY category")?;
    println!("Sum of values by category:");
    println!("{}", result);

    let result = session.execute("SELECT category, AVG(value) AS avg_value FROM data GROUP BY category")?;
    println!("\nAverage value by category:");
    println!("{}", result);

    // Join the registered frame with a table created through SQL
    session.execute("CREATE TABLE categories (category STRING, description STRING)")?;
    session.execute("INSERT INTO categories VALUES ('A', 'Category A'), ('B', 'Category B'), ('C', 'Category C')")?;

    let result = session.execute(
        "SELECT d.category, d.value, c.description
         FROM data d
         JOIN categories c ON d.category = c.category",
    )?;
    println!("\nJoined data with categories:");
    println!("{}", result);

    Ok(())
}
