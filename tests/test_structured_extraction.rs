mod common;

use common::{recipe_page, test_config, FakeModel};
use recipe_extract::{ExtractionMethod, RecipeExtractor, SourceKind};

const LASAGNA: &str = r#"
{
    "@context": "https://schema.org",
    "@graph": [
        {"@type": "WebPage", "name": "Lasagna | Example Kitchen"},
        {
            "@type": "Recipe",
            "name": "Weeknight Lasagna",
            "image": ["https://img.example.com/lasagna-1x1.jpg", "https://img.example.com/lasagna-4x3.jpg"],
            "recipeYield": ["8", "8 servings"],
            "totalTime": "PT1H10M",
            "recipeIngredient": ["12 lasagna noodles", "2 cups ricotta", "3 cups marinara &amp; basil"],
            "recipeInstructions": [
                {
                    "@type": "HowToSection",
                    "name": "Prep",
                    "itemListElement": [
                        {"@type": "HowToStep", "text": "Boil the noodles."},
                        {"@type": "HowToStep", "text": "Mix ricotta with egg."}
                    ]
                },
                {"@type": "HowToStep", "text": "Layer and bake for 45 minutes."}
            ]
        }
    ]
}
"#;

#[tokio::test]
async fn test_json_ld_recipe_through_full_pipeline() {
    let scratch = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/lasagna")
        .match_header("referer", "https://www.google.com/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(recipe_page(LASAGNA))
        .create_async()
        .await;

    let model = FakeModel::new("{}");
    let recipe = RecipeExtractor::builder()
        .config(test_config(scratch.path()))
        .completion_provider(model.clone())
        .url(format!("{}/lasagna", server.url()))
        .build()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(recipe.title, "Weeknight Lasagna");
    assert_eq!(
        recipe.ingredients,
        vec!["12 lasagna noodles", "2 cups ricotta", "3 cups marinara & basil"]
    );
    assert_eq!(
        recipe.instructions,
        vec![
            "Boil the noodles.",
            "Mix ricotta with egg.",
            "Layer and bake for 45 minutes."
        ]
    );
    assert_eq!(recipe.image, "https://img.example.com/lasagna-1x1.jpg");
    assert_eq!(recipe.recipe_yield, "8 servings");
    assert_eq!(recipe.time, 70);
    assert_eq!(recipe.source, SourceKind::Website);
    assert_eq!(recipe.method, ExtractionMethod::StructuredData);
    // Structured markup never reaches the model
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_structured_extraction_is_repeatable() {
    let scratch = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/lasagna")
        .with_status(200)
        .with_body(recipe_page(LASAGNA))
        .expect(2)
        .create_async()
        .await;
    let url = format!("{}/lasagna", server.url());

    let orchestrator = RecipeExtractor::builder()
        .config(test_config(scratch.path()))
        .without_video()
        .build_orchestrator()
        .unwrap();
    let first = orchestrator.extract(&url).await.unwrap();
    let second = orchestrator.extract(&url).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first.title, second.title);
    assert_eq!(first.ingredients, second.ingredients);
    assert_eq!(first.instructions, second.instructions);
}

#[tokio::test]
async fn test_microdata_page() {
    let scratch = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/soup")
        .with_status(200)
        .with_body(
            r#"<html><body>
            <div itemscope itemtype="https://schema.org/Recipe">
                <h1 itemprop="name">Tomato Soup</h1>
                <meta itemprop="totalTime" content="PT30M">
                <span itemprop="recipeYield">4 bowls</span>
                <ul>
                    <li itemprop="recipeIngredient">6 tomatoes</li>
                    <li itemprop="recipeIngredient">1 onion</li>
                </ul>
                <div itemprop="recipeInstructions">Roast the tomatoes.</div>
            </div>
            </body></html>"#,
        )
        .create_async()
        .await;

    let recipe = RecipeExtractor::builder()
        .config(test_config(scratch.path()))
        .without_video()
        .url(format!("{}/soup", server.url()))
        .build()
        .await
        .unwrap();

    assert_eq!(recipe.title, "Tomato Soup");
    assert_eq!(recipe.ingredients, vec!["6 tomatoes", "1 onion"]);
    assert_eq!(recipe.instructions, vec!["Roast the tomatoes."]);
    assert_eq!(recipe.time, 30);
}

#[tokio::test]
async fn test_blank_url_is_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let result = RecipeExtractor::builder()
        .config(test_config(scratch.path()))
        .url("   \t ")
        .build()
        .await;
    assert!(matches!(result, Err(recipe_extract::ExtractError::InvalidUrl(_))));
}
