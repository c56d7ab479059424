#[macro_use]
extern crate rocket;

use rocket::response::content;
use rocket::serde::json::Json;
use rocket::State;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use flag_quiz_server::{
    continent::Continent,
    error::Result,
    quiz::{Quiz, QuizState, SessionSummary},
    quiz_config::QuizConfig,
};

#[derive(Serialize, Debug)]
struct QuizResponse {
    quiz_state: Option<QuizState>,
    payload: Option<serde_json::Value>,
    error: Option<String>,
}

impl QuizResponse {
    fn success(quiz_state: QuizState) -> Self {
        QuizResponse {
            quiz_state: Some(quiz_state),
            payload: None,
            error: None,
        }
    }

    fn with_payload<T: Serialize>(quiz_state: QuizState, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => QuizResponse {
                quiz_state: Some(quiz_state),
                payload: Some(value),
                error: None,
            },
            Err(e) => QuizResponse::error(Some(quiz_state), e.to_string()),
        }
    }

    fn error(quiz_state: Option<QuizState>, error: String) -> Self {
        QuizResponse {
            quiz_state,
            payload: None,
            error: Some(error),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
struct FilterData {
    continents: Vec<String>,
}

#[derive(serde::Deserialize, Clone)]
struct ContinentData {
    continent: String,
    enabled: bool,
}

#[derive(serde::Deserialize, Clone)]
struct StartSessionData {
    duration_seconds: Option<u32>,
}

#[derive(serde::Deserialize, Clone)]
struct ChooseData {
    iso_code: String,
    round_id: Option<u64>,
}

#[derive(serde::Deserialize, Clone)]
struct NewQuizData {
    config_file: Option<String>,
    seed: Option<u64>,
}

#[derive(Clone)]
enum Request {
    ConfigureFilter(FilterData),
    SetContinent(ContinentData),
    StartSession(StartSessionData),
    StopSession,
    Choose(ChooseData),
    RequestHint,
    ResetCounters,
    NewQuiz(NewQuizData),
    Tick,
    GetQuizState,
    GetRound,
    GetStats,
    GetTimer,
    GetSummaries,
}

struct RequestWithResponse {
    request: Request,
    response_sender: oneshot::Sender<QuizResponse>,
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
        endpoint("/quiz-state", "GET", "Get the full state of the quiz"),
        endpoint("/round", "GET", "Get the current round: four candidates and the target flag"),
        endpoint("/stats", "GET", "Get correct and wrong choices, score and streak"),
        endpoint("/timer", "GET", "Get the session timer"),
        endpoint("/summaries", "GET", "Get the summaries of finished sessions"),
        endpoint("/filter", "POST", "Replace the set of enabled continents"),
        endpoint("/continent", "POST", "Enable or disable a single continent"),
        endpoint("/start-session", "POST", "Start a timed session, resetting the counters"),
        endpoint("/stop-session", "POST", "Cancel the running session without a summary"),
        endpoint("/choose", "POST", "Choose a country for the current round by ISO code"),
        endpoint("/hint", "POST", "Reveal a hint for the current target at a scoring cost"),
        endpoint("/reset", "POST", "Reset the counters and draw a new round"),
        endpoint("/new-quiz", "POST", "Start a new quiz with an optional catalog file and seed"),
    ];

    match serde_json::to_string_pretty(&endpoints) {
        Ok(json) => content::RawJson(json),
        Err(e) => content::RawJson(format!("{{\"error\": \"{}\"}}", e)),
    }
}

#[get("/quiz-state")]
async fn quiz_state(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::GetQuizState).await
}

#[get("/round")]
async fn round(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::GetRound).await
}

#[get("/stats")]
async fn stats(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::GetStats).await
}

#[get("/timer")]
async fn timer(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::GetTimer).await
}

#[get("/summaries")]
async fn summaries(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::GetSummaries).await
}

#[post("/filter", data = "<data>")]
async fn filter(data: Json<FilterData>, state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::ConfigureFilter(data.into_inner())).await
}

#[post("/continent", data = "<data>")]
async fn continent(data: Json<ContinentData>, state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::SetContinent(data.into_inner())).await
}

#[post("/start-session", data = "<data>")]
async fn start_session(
    data: Json<StartSessionData>,
    state: &State<SharedState>,
) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::StartSession(data.into_inner())).await
}

#[post("/stop-session")]
async fn stop_session(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::StopSession).await
}

#[post("/choose", data = "<data>")]
async fn choose(data: Json<ChooseData>, state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::Choose(data.into_inner())).await
}

#[post("/hint")]
async fn hint(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::RequestHint).await
}

#[post("/reset")]
async fn reset(state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::ResetCounters).await
}

#[post("/new-quiz", data = "<data>")]
async fn new_quiz(data: Json<NewQuizData>, state: &State<SharedState>) -> Json<QuizResponse> {
    send_request_and_wait(state, Request::NewQuiz(data.into_inner())).await
}

async fn send_request_and_wait(state: &State<SharedState>, request: Request) -> Json<QuizResponse> {
    let (response_sender, response_receiver) = oneshot::channel();
    let sent = state
        .sender
        .send(RequestWithResponse {
            request,
            response_sender,
        })
        .await;
    if sent.is_err() {
        return Json(QuizResponse::error(None, "Quiz worker is not running".to_string()));
    }

    match response_receiver.await {
        Ok(response) => Json(response),
        Err(_) => Json(QuizResponse::error(None, "Quiz worker dropped the request".to_string())),
    }
}

fn parse_continents(names: &[String]) -> Result<BTreeSet<Continent>> {
    names.iter().map(|name| name.parse::<Continent>()).collect()
}

fn build_quiz(config_file: Option<&str>, seed: Option<u64>) -> Result<Quiz> {
    let mut config = match config_file {
        Some(path) => QuizConfig::load_from_file(path)?,
        None => QuizConfig::default_catalog()?,
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut quiz = Quiz::from_config(config)?;
    quiz.on_session_end(|summary| {
        tracing::info!(
            score = summary.stats.score,
            accuracy = summary.accuracy_percent,
            continents = %summary.continents_label,
            "session ended"
        );
    });
    Ok(quiz)
}

fn respond<T: Serialize>(quiz: &Quiz, result: Result<T>) -> QuizResponse {
    match result {
        Ok(payload) => QuizResponse::with_payload(quiz.quiz_state(), &payload),
        Err(e) => QuizResponse::error(Some(quiz.quiz_state()), e.to_string()),
    }
}

fn tick_and_record(quiz: &mut Quiz, summary_store: &mut Vec<SessionSummary>) -> Option<SessionSummary> {
    let summary = quiz.tick();
    if let Some(summary) = &summary {
        summary_store.push(summary.clone());
    }
    summary
}

async fn worker_task(
    mut receiver: mpsc::Receiver<RequestWithResponse>,
    quiz: Arc<Mutex<Quiz>>,
) {
    // Summaries are recorded here, in the same step as the expiring tick, so a
    // later request always sees them.
    let mut summary_store: Vec<SessionSummary> = Vec::new();
    while let Some(RequestWithResponse {
        request,
        response_sender,
    }) = receiver.recv().await
    {
        let mut quiz = quiz.lock().await;
        let response = match request {
            Request::ConfigureFilter(data) => {
                let result = parse_continents(&data.continents)
                    .and_then(|continents| quiz.configure_filter(&continents));
                respond(&quiz, result)
            }
            Request::SetContinent(data) => {
                let result = data
                    .continent
                    .parse::<Continent>()
                    .and_then(|continent| quiz.set_continent_enabled(continent, data.enabled));
                respond(&quiz, result)
            }
            Request::StartSession(data) => {
                let duration = data.duration_seconds.unwrap_or(quiz.session_seconds());
                let result = quiz.start_session(duration);
                respond(&quiz, result)
            }
            Request::StopSession => {
                quiz.stop_session();
                QuizResponse::success(quiz.quiz_state())
            }
            Request::Choose(data) => {
                let result = match data.round_id {
                    Some(round_id) => quiz.choose_in_round(round_id, &data.iso_code),
                    None => quiz.choose_country(&data.iso_code),
                };
                respond(&quiz, result)
            }
            Request::RequestHint => {
                let result = quiz.request_hint();
                respond(&quiz, result)
            }
            Request::ResetCounters => {
                let result = quiz.reset_counters();
                respond(&quiz, result)
            }
            Request::NewQuiz(data) => {
                match build_quiz(data.config_file.as_deref(), data.seed) {
                    Ok(new_quiz) => {
                        *quiz = new_quiz;
                        tracing::info!(countries = quiz.catalog().len(), "started new quiz");
                        QuizResponse::success(quiz.quiz_state())
                    }
                    Err(e) => QuizResponse::error(Some(quiz.quiz_state()), e.to_string()),
                }
            }
            Request::Tick => {
                let summary = tick_and_record(&mut quiz, &mut summary_store);
                QuizResponse::with_payload(quiz.quiz_state(), &summary)
            }
            Request::GetQuizState => QuizResponse::success(quiz.quiz_state()),
            Request::GetRound => {
                QuizResponse::with_payload(quiz.quiz_state(), quiz.current_round())
            }
            Request::GetStats => {
                QuizResponse::with_payload(quiz.quiz_state(), &quiz.current_stats())
            }
            Request::GetTimer => {
                QuizResponse::with_payload(quiz.quiz_state(), &quiz.current_timer())
            }
            Request::GetSummaries => QuizResponse::with_payload(quiz.quiz_state(), &summary_store),
        };
        // The tick source does not wait for its response.
        let _ = response_sender.send(response);
    }
}

/// Delivers one tick per second through the worker so ticks serialize with
/// every other mutation.
async fn tick_task(sender: mpsc::Sender<RequestWithResponse>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;
    loop {
        interval.tick().await;
        let (response_sender, _response_receiver) = oneshot::channel();
        let request = RequestWithResponse {
            request: Request::Tick,
            response_sender,
        };
        if sender.send(request).await.is_err() {
            break;
        }
    }
}

#[launch]
async fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flag_quiz_server=info")),
        )
        .init();

    let (sender, receiver) = mpsc::channel::<RequestWithResponse>(100);

    let config_file = std::env::var("QUIZ_CONFIG").ok();
    let quiz = build_quiz(config_file.as_deref(), None)
        .expect("Unable to build quiz from configuration");
    tracing::info!(countries = quiz.catalog().len(), "flag quiz ready");

    let quiz = Arc::new(Mutex::new(quiz));

    tokio::spawn(worker_task(receiver, quiz));
    tokio::spawn(tick_task(sender.clone()));

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
                quiz_state,
                round,
                stats,
                timer,
                summaries,
                filter,
                continent,
                start_session,
                stop_session,
                choose,
                hint,
                reset,
                new_quiz
            ],
        )
        .attach(cors)
}
