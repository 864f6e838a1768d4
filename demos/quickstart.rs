/// Quickstart - merge an API payload into an in-memory collection
use jsonapi_merge::{impl_model, Config, Marshaler, Unmarshaler};

#[derive(Debug, Default, Clone, PartialEq)]
struct Article {
    id: u64,
    title: String,
    published: bool,
    author_id: Option<u64>,
    tag_ids: Vec<String>,
}

impl_model!(Article { id, title, published, author_id, tag_ids });

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== jsonapi-merge Quick Start ===\n");

    // Step 1: What we already have locally
    let mut articles = vec![Article {
        id: 1,
        title: "Draft title".into(),
        published: false,
        author_id: Some(10),
        tag_ids: vec!["rust".into()],
    }];

    // Step 2: A payload from the server
    let payload = br#"{
        "articles": [
            {"id": "1", "title": "Final title", "published": true, "links": {"tags": ["rust", "serde"]}},
            {"id": "2", "title": "Follow-up", "links": {"author": "11"}}
        ]
    }"#;

    // Step 3: Merge it
    let unmarshaler = Unmarshaler::<Article>::new(Config::default())?;
    unmarshaler.unmarshal_from_json(payload, &mut articles)?;

    println!("Merged {} articles:\n", articles.len());
    for article in &articles {
        println!("  {:?}", article);
    }

    // Step 4: And back out again
    let document = Marshaler::<Article>::new(Config::default())?.marshal(&articles)?;
    println!("\nAs a document:");
    println!("{}", serde_json::to_string_pretty(&document)?);

    Ok(())
}
