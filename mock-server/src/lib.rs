use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Bearer token accepted by `/api/me`.
pub const TOKEN: &str = "r2d2";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    pub films: Vec<String>,
    pub species: Vec<String>,
    pub vehicles: Vec<String>,
    pub starships: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct NewPerson {
    pub name: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub mass: String,
    #[serde(default)]
    pub gender: String,
}

#[derive(Deserialize)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub height: Option<String>,
    pub mass: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeoplePage {
    pub count: usize,
    pub results: Vec<Person>,
}

#[derive(Deserialize)]
pub struct Search {
    pub search: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<String, Person>>>;

type Failure = (StatusCode, Json<Value>);

pub fn luke_skywalker() -> Person {
    Person {
        name: "Luke Skywalker".to_string(),
        height: "172".to_string(),
        mass: "77".to_string(),
        hair_color: "blond".to_string(),
        skin_color: "fair".to_string(),
        eye_color: "blue".to_string(),
        birth_year: "19BBY".to_string(),
        gender: "male".to_string(),
        homeworld: "https://swapi.dev/api/planets/1/".to_string(),
        films: [2, 6, 3, 1, 7]
            .iter()
            .map(|n| format!("https://swapi.dev/api/films/{n}/"))
            .collect(),
        species: vec!["https://swapi.dev/api/species/1/".to_string()],
        vehicles: vec![
            "https://swapi.dev/api/vehicles/14/".to_string(),
            "https://swapi.dev/api/vehicles/30/".to_string(),
        ],
        starships: vec![
            "https://swapi.dev/api/starships/12/".to_string(),
            "https://swapi.dev/api/starships/22/".to_string(),
        ],
        created: "2014-12-09T13:50:51.644000Z".to_string(),
        edited: "2014-12-20T21:17:56.891000Z".to_string(),
        url: "https://swapi.dev/api/people/1/".to_string(),
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::from([(
        "1".to_string(),
        luke_skywalker(),
    )])));
    Router::new()
        .route("/api/people/", get(list_people).post(create_person))
        .route(
            "/api/people/{id}",
            get(get_person)
                .put(replace_person)
                .patch(update_person)
                .delete(delete_person),
        )
        .route("/api/me", get(me))
        .route("/api/broken", get(broken))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> Failure {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" })))
}

async fn list_people(State(db): State<Db>, Query(query): Query<Search>) -> Json<PeoplePage> {
    let people = db.read().await;
    let needle = query.search.unwrap_or_default().to_lowercase();
    let mut results: Vec<Person> = people
        .values()
        .filter(|person| person.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    results.sort_by(|a, b| a.name.cmp(&b.name));
    Json(PeoplePage {
        count: results.len(),
        results,
    })
}

async fn create_person(
    State(db): State<Db>,
    Json(input): Json<NewPerson>,
) -> (StatusCode, Json<Person>) {
    let id = Uuid::new_v4().to_string();
    let person = Person {
        name: input.name,
        height: input.height,
        mass: input.mass,
        gender: input.gender,
        url: format!("/api/people/{id}"),
        ..Person::default()
    };
    tracing::debug!(%id, name = %person.name, "created person");
    db.write().await.insert(id, person.clone());
    (StatusCode::CREATED, Json(person))
}

async fn get_person(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Person>, Failure> {
    let people = db.read().await;
    people.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn replace_person(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<NewPerson>,
) -> Result<Json<Person>, Failure> {
    let mut people = db.write().await;
    let person = people.get_mut(&id).ok_or_else(not_found)?;
    person.name = input.name;
    person.height = input.height;
    person.mass = input.mass;
    person.gender = input.gender;
    Ok(Json(person.clone()))
}

async fn update_person(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<PersonPatch>,
) -> Result<Json<Person>, Failure> {
    let mut people = db.write().await;
    let person = people.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        person.name = name;
    }
    if let Some(height) = input.height {
        person.height = height;
    }
    if let Some(mass) = input.mass {
        person.mass = mass;
    }
    if let Some(gender) = input.gender {
        person.gender = gender;
    }
    Ok(Json(person.clone()))
}

async fn delete_person(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, Failure> {
    let mut people = db.write().await;
    tracing::debug!(%id, "deleting person");
    people.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or_else(not_found)
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Person>, (StatusCode, &'static str)> {
    let expected = format!("Bearer {TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    let people = db.read().await;
    people
        .get("1")
        .cloned()
        .map(Json)
        .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::OK, "<html>not json</html>")
}
