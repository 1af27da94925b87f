#[macro_use]
extern crate rocket;

use rocket::response::content;
use rocket::serde::json::Json;
use rocket::State;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use grid_war::{
    game::{Game, GameState},
    game_config::GameConfig,
    grid::Position,
};

#[derive(Serialize, Debug)]
struct GameResponse {
    game_state: Option<GameState>,
    error: Option<String>,
}

impl GameResponse {
    fn success(game_state: GameState) -> Self {
        GameResponse {
            game_state: Some(game_state),
            error: None,
        }
    }

    fn error(game_state: Option<GameState>, error: String) -> Self {
        GameResponse {
            game_state,
            error: Some(error),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
struct MoveData {
    from: Position,
    to: Position,
}

#[derive(serde::Deserialize, Clone)]
struct NewGameData {
    config_file: Option<String>,
    num_opponents: Option<usize>,
    seed: Option<u64>,
}

#[derive(Clone)]
enum Request {
    Move(MoveData),
    Pass,
    Restart,
    NewGame(NewGameData),
    GetGameState,
}

struct RequestWithResponse {
    request: Request,
    response_sender: oneshot::Sender<GameResponse>,
}

struct SharedState {
    sender: mpsc::Sender<RequestWithResponse>,
}

#[derive(Serialize)]
struct ApiEndpoint {
    path: String,
    method: String,
    description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> ApiEndpoint {
    ApiEndpoint {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

#[get("/")]
fn api_documentation() -> content::RawJson<String> {
    let endpoints = vec![
        endpoint("/", "GET", "Shows this API documentation"),
        endpoint("/game-state", "GET", "Get the current state of the game"),
        endpoint(
            "/move",
            "POST",
            "Move the whole stack on one of your cells one or two cells along a row or column",
        ),
        endpoint("/pass", "POST", "Skip your move and let the AI countries play"),
        endpoint("/restart", "POST", "Restart the current game with the same countries"),
        endpoint(
            "/new-game",
            "POST",
            "Start a new game with optional config file, opponent count and seed",
        ),
    ];

    content::RawJson(serde_json::to_string_pretty(&endpoints).unwrap_or_default())
}

#[post("/move", data = "<data>")]
async fn player_move(data: Json<MoveData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Move(data.into_inner())).await
}

#[post("/pass")]
async fn pass(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Pass).await
}

#[post("/restart")]
async fn restart(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Restart).await
}

#[post("/new-game", data = "<data>")]
async fn new_game(state: &State<SharedState>, data: Json<NewGameData>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::NewGame(data.into_inner())).await
}

#[get("/game-state")]
async fn game_state(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::GetGameState).await
}

async fn send_request_and_wait(state: &State<SharedState>, request: Request) -> Json<GameResponse> {
    let (response_sender, response_receiver) = oneshot::channel();
    let sent = state
        .sender
        .send(RequestWithResponse {
            request,
            response_sender,
        })
        .await;
    if sent.is_err() {
        return Json(GameResponse::error(None, "Game worker has stopped".to_string()));
    }

    match response_receiver.await {
        Ok(response) => Json(response),
        Err(_) => Json(GameResponse::error(None, "Game worker dropped the request".to_string())),
    }
}

fn build_game(data: &NewGameData) -> grid_war::error::Result<Game> {
    let mut config = match &data.config_file {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::with_opponents(data.num_opponents.unwrap_or(5)),
    };
    if let Some(seed) = data.seed {
        config.seed = Some(seed);
    }
    Game::new(config)
}

async fn worker_task(mut receiver: mpsc::Receiver<RequestWithResponse>, game: Arc<Mutex<Game>>) {
    while let Some(RequestWithResponse {
        request,
        response_sender,
    }) = receiver.recv().await
    {
        let mut game = game.lock().await;
        let response = match request {
            Request::Move(data) => {
                let outcome = game.attempt_player_move(data.from, data.to);
                match outcome.rejection {
                    None => GameResponse::success(game.get_game_state()),
                    Some(e) => GameResponse::error(Some(game.get_game_state()), e.to_string()),
                }
            }
            Request::Pass => match game.pass_turn() {
                Ok(_) => GameResponse::success(game.get_game_state()),
                Err(e) => GameResponse::error(Some(game.get_game_state()), e.to_string()),
            },
            Request::Restart => match game.restart() {
                Ok(()) => GameResponse::success(game.get_game_state()),
                Err(e) => GameResponse::error(Some(game.get_game_state()), e.to_string()),
            },
            Request::NewGame(data) => match build_game(&data) {
                Ok(new_game) => {
                    *game = new_game;
                    GameResponse::success(game.get_game_state())
                }
                Err(e) => {
                    warn!(error = %e, "new game rejected");
                    GameResponse::error(Some(game.get_game_state()), e.to_string())
                }
            },
            Request::GetGameState => GameResponse::success(game.get_game_state()),
        };
        if response_sender.send(response).is_err() {
            warn!("client went away before the response was sent");
        }
    }
}

#[launch]
async fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (sender, receiver) = mpsc::channel::<RequestWithResponse>(100);
    let game = Game::new(GameConfig::default()).expect("Default config must produce a game");
    info!(countries = game.countries().len(), "serving grid war");
    let game = Arc::new(Mutex::new(game));

    tokio::spawn(worker_task(receiver, game.clone()));

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Error creating CORS middleware");

    rocket::build()
        .manage(SharedState { sender })
        .mount(
            "/",
            routes![
                api_documentation,
                player_move,
                pass,
                restart,
                game_state,
                new_game
            ],
        )
        .attach(cors)
}
