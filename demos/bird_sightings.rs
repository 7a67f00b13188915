use tabuladb::demo::bird_sightings;
use tabuladb::Session;

fn main() -> anyhow::Result<()> {
    let mut session = Session::new();
    session.register("bird_sightings", bird_sightings()?)?;

    let result = session.execute("SELECT species FROM bird_sightings WHERE count > 20")?;
    println!("Birds with more than 20 sightings:");
    println!("{}", result);

    session.execute("CREATE TABLE migration_data (species STRING, distance_km INTEGER)")?;
    session.execute(
        "INSERT INTO migration_data VALUES ('Mallard', 1500), ('Wood Duck', 800), ('Gadwall', 2000), ('Pintail', 2500)",
    )?;

    let sql = "SELECT b.species, b.count, m.distance_km
               FROM bird_sightings b
               JOIN migration_data m ON b.species = m.species
               WHERE m.distance_km > 1000
               ORDER BY m.distance_km DESC";
    let result = session.execute(sql)?;
    println!("\nBirds that migrate more than 1000 km:");
    println!("{}", result);

    println!("\nQuery plan:");
    println!("{}", session.explain(sql)?);

    Ok(())
}
