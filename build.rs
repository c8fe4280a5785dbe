use std::collections::HashMap;
use std::path::Path;

fn main() {
    let catalog_path = Path::new("catalogs/books.json");
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the catalog file before building.\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    let books = catalog.get("books").unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Missing 'books' field\n\
             The catalog must have a top-level 'books' array.\n"
        );
    });

    let books = books.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: 'books' must be an array\n\
             Got: {books}\n"
        );
    });

    assert!(
        !books.is_empty(),
        "\n\nCATALOG BUILD ERROR: 'books' must not be empty\n"
    );

    let total_aliases = validate_books(books);

    println!(
        "cargo:warning=Validated catalog: {} books, {total_aliases} aliases",
        books.len()
    );
}

fn validate_books(books: &[serde_json::Value]) -> usize {
    // Normalized alias -> owning book id, to catch cross-book collisions early
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut total_aliases = 0;

    for (i, book) in books.iter().enumerate() {
        let book_id = book
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");

        validate_book_fields(book, book_id, i);

        let aliases = book
            .get("aliases")
            .and_then(|a| a.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let name = book.get("canonical_name").and_then(|v| v.as_str());

        for alias in aliases
            .iter()
            .filter_map(serde_json::Value::as_str)
            .chain(name)
        {
            let key = alias.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            assert!(
                !key.is_empty(),
                "\n\nCATALOG BUILD ERROR: Book '{book_id}' has a blank alias\n"
            );
            if let Some(owner) = seen.get(&key) {
                assert!(
                    owner == book_id,
                    "\n\nCATALOG BUILD ERROR: Alias '{alias}' is shared by '{owner}' and '{book_id}'\n"
                );
            } else {
                seen.insert(key, book_id.to_string());
                total_aliases += 1;
            }
        }
    }

    total_aliases
}

fn validate_book_fields(book: &serde_json::Value, book_id: &str, index: usize) {
    assert!(
        book.get("id").is_some(),
        "\n\nCATALOG BUILD ERROR: Book at index {index} missing 'id' field\n"
    );
    assert!(
        book.get("canonical_name").is_some(),
        "\n\nCATALOG BUILD ERROR: Book '{book_id}' (index {index}) missing 'canonical_name' field\n"
    );
    assert!(
        book.get("aliases").and_then(|a| a.as_array()).is_some(),
        "\n\nCATALOG BUILD ERROR: Book '{book_id}' (index {index}) missing 'aliases' array\n"
    );

    let testament = book.get("testament").and_then(|v| v.as_str());
    assert!(
        matches!(testament, Some("old" | "new")),
        "\n\nCATALOG BUILD ERROR: Book '{book_id}' (index {index}) has invalid 'testament'\n\
         Expected \"old\" or \"new\".\n"
    );

    let chapters = book.get("chapter_count").and_then(serde_json::Value::as_u64);
    assert!(
        chapters.is_some_and(|c| c > 0),
        "\n\nCATALOG BUILD ERROR: Book '{book_id}' (index {index}) needs 'chapter_count' > 0\n"
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed=catalogs/books.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
