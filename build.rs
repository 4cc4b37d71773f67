fn main() {
    // sqlx::test embeds the migrations directory at compile time, so tests
    // must be rebuilt whenever a migration is added or edited.
    println!("cargo:rerun-if-changed=migrations");
}
