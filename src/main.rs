use std::collections::HashMap;
use std::sync::Arc;

use movie_recommender::{
    db::{seed, CatalogSource, InMemoryCatalog, Snapshot},
    models::{MovieId, UserId},
    services::{
        recommendations::candidate_movies, DiscoveryService, RecommendationService, Strategy,
    },
    Config,
};
use tracing_subscriber::{prelude::*, EnvFilter};

const DEMO_USERS: &[u64] = &[1, 2, 3, 4, 5];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Seeding demo catalog...");
    let catalog = Arc::new(seed::demo_catalog().await?);

    let titles = movie_titles(catalog.as_ref()).await?;
    let usernames: HashMap<UserId, String> = catalog
        .list_users()
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let recommendations = RecommendationService::new(catalog.clone(), config.hybrid()?);
    let discovery = DiscoveryService::new(catalog.clone(), config.discovery());
    let limit = config.demo_limit;

    for id in DEMO_USERS {
        let user_id = UserId(*id);
        let name = usernames
            .get(&user_id)
            .map(String::as_str)
            .unwrap_or("unknown");
        println!("\n=== Recommendations for {} ===", name);

        for strategy in [Strategy::Hybrid, Strategy::Collaborative, Strategy::Content] {
            let movies = recommendations.recommend(user_id, limit, strategy).await?;
            print_movies(&strategy.to_string(), &movies, &titles);
        }
    }

    let john = UserId(1);
    let snapshot = Snapshot::load(catalog.as_ref()).await?;
    let unseen = candidate_movies(&snapshot, john);
    let mut scores: Vec<(MovieId, f64)> = recommendations
        .predict_ratings(john, &unseen, Strategy::Hybrid)
        .await?
        .into_iter()
        .collect();
    scores.sort_by_key(|(id, _)| *id);
    let report: Vec<serde_json::Value> = scores
        .iter()
        .map(|(id, score)| {
            serde_json::json!({
                "movie_id": id,
                "title": titles.get(id),
                "predicted": (score * 100.0).round() / 100.0,
            })
        })
        .collect();
    println!("\n=== Hybrid scores for johndoe ===");
    println!("{}", serde_json::to_string_pretty(&report)?);

    println!("\n=== Discovery ===");
    let anchor = MovieId(1);
    let similar = discovery.similar_movies(anchor, limit).await?;
    let label = format!(
        "similar to {}",
        titles.get(&anchor).map(String::as_str).unwrap_or("?")
    );
    print_movies(&label, &similar, &titles);

    let trending = discovery.trending_movies(limit, None).await?;
    print_movies("trending", &trending, &titles);

    Ok(())
}

async fn movie_titles(catalog: &InMemoryCatalog) -> anyhow::Result<HashMap<MovieId, String>> {
    Ok(catalog
        .list_movies()
        .await?
        .into_iter()
        .map(|m| (m.id, m.title))
        .collect())
}

fn print_movies(label: &str, movies: &[MovieId], titles: &HashMap<MovieId, String>) {
    if movies.is_empty() {
        println!("  {}: (nothing to suggest)", label);
        return;
    }

    println!("  {}:", label);
    for (rank, movie_id) in movies.iter().enumerate() {
        let title = titles.get(movie_id).map(String::as_str).unwrap_or("?");
        println!("    {}. {}", rank + 1, title);
    }
}
