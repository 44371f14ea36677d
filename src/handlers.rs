use crate::catalogue::{Catalogue, GENRE_FILTERS};
use crate::config::Config;
use crate::database::VisitDb;
use crate::detail::DetailView;
use crate::interaction::{
    self, ClientTuning, Filter, Modal, Modals, INFO_NOTICE, PLAY_NOTICE, REGISTERED_NOTICE,
};
use crate::model::{Movie, Visit};
use crate::session::{RegistrationForm, SessionState, Shelf, ValidationErrors};
use actix_identity::Identity;
use actix_web::{error, web, HttpRequest, HttpResponse};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub struct AppState {
    pub catalogue: Catalogue,
    pub config: Config,
}

type Tera = web::Data<tera::Tera>;
type Db = web::Data<sled::Db>;
type State = web::Data<AppState>;

pub fn log_error<E: std::fmt::Debug>(err: E, message: &'static str) -> error::Error {
    debug!("{:?}", err);
    error::ErrorInternalServerError(message)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/explorar", web::get().to(browse))
        .route("/buscar", web::get().to(search))
        .route("/registro", web::post().to(register))
        .route("/entrar", web::post().to(login))
        .route("/salir", web::get().to(logout))
        .route("/lista/{id}", web::post().to(toggle_list))
        .route("/like/{id}", web::post().to(toggle_like))
        .route("/seleccionar/{id}", web::get().to(select))
        .route("/detalle", web::get().to(detail))
        .route("/reproducir/{id}", web::post().to(play))
        .route("/info/{id}", web::post().to(more_info))
        .route("/cerrar", web::get().to(close_modal));
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("location", location))
        .finish()
}

fn render(tera: &tera::Tera, template: &str, ctx: &tera::Context) -> actix_web::Result<HttpResponse> {
    let body = tera
        .render(template, ctx)
        .map_err(|err| log_error(err, "Template error"))?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Only same-site absolute paths are followed back.
fn local_path(path: &str) -> &str {
    if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') {
        path
    } else {
        "/"
    }
}

fn here(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| "/".to_owned(), |p| p.as_str().to_owned())
}

fn known_visitor(id: &Identity) -> Option<u64> {
    id.identity().and_then(|v| v.parse().ok())
}

/// Visitor id of the request, issuing a cookie when there is none yet. Only
/// handlers that store something call this.
fn visitor(id: &Identity, db: &sled::Db) -> actix_web::Result<u64> {
    if let Some(visitor) = known_visitor(id) {
        return Ok(visitor);
    }
    let visitor = db
        .new_visitor()
        .map_err(|err| log_error(err, "Database error"))?;
    debug!("New visitor {}", visitor);
    id.remember(visitor.to_string());
    Ok(visitor)
}

/// Loads the visit for rendering and consumes its pending notice. The visit
/// is only written back when there was a notice to consume.
fn take_visit(db: &sled::Db, visitor: u64) -> actix_web::Result<Visit> {
    let visit = db
        .get_visit(visitor)
        .map_err(|err| log_error(err, "Database error"))?;
    if visit.notice.is_none() {
        return Ok(visit);
    }
    db.update_visit(visitor, |visit| {
        let snapshot = visit.clone();
        visit.notice = None;
        snapshot
    })
    .map_err(|err| log_error(err, "Database error"))
}

/// Visit shown by a plain page view; anonymous requests get an empty one.
fn page_visit(id: &Identity, db: &sled::Db) -> actix_web::Result<Visit> {
    match known_visitor(id) {
        Some(visitor) => take_visit(db, visitor),
        None => Ok(Visit::default()),
    }
}

fn set_notice(db: &sled::Db, visitor: u64, notice: &str) -> actix_web::Result<()> {
    db.update_visit(visitor, |visit| visit.notice = Some(notice.to_owned()))
        .map_err(|err| log_error(err, "Database error"))
}

#[derive(Serialize)]
struct Card {
    id: &'static str,
    title: &'static str,
    meta: String,
    image: &'static str,
    link: String,
    list_label: &'static str,
    like_label: &'static str,
    hidden: bool,
}

impl Card {
    fn new(movie: &'static Movie, session: &SessionState, hidden: bool) -> Card {
        Card {
            id: movie.id,
            title: movie.title,
            meta: movie.meta(),
            image: movie.image,
            link: interaction::select_link(movie),
            list_label: session.membership(Shelf::List, movie.title).label(),
            like_label: session.membership(Shelf::Likes, movie.title).label(),
            hidden,
        }
    }
}

#[derive(Serialize)]
struct Row {
    heading: &'static str,
    cards: Vec<Card>,
}

#[derive(Serialize, Default)]
struct Prefill<'a> {
    username: &'a str,
    email: &'a str,
}

fn page_context(here: &str, visit: &Visit, modals: Modals) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("here", here);
    ctx.insert(
        "username",
        &visit.session.current_user().map(|user| user.username.as_str()),
    );
    ctx.insert("notice", &visit.notice);
    ctx.insert("modals", &modals);
    ctx.insert("errors", &ValidationErrors::default());
    ctx.insert("prefill", &Prefill::default());
    ctx.insert("success", &None::<&str>);
    ctx.insert("refresh_after", &None::<f64>);
    ctx.insert("query", "");
    ctx.insert("results", &Vec::<interaction::SearchHit>::new());
    ctx.insert("search_message", &None::<&str>);
    ctx.insert("client", &ClientTuning::default());
    ctx
}

fn home_context(state: &AppState, here: &str, visit: &Visit, modals: Modals) -> tera::Context {
    let mut ctx = page_context(here, visit, modals);
    let session = &visit.session;
    if let Some(hero) = state.catalogue.iter().next() {
        ctx.insert("hero", &Card::new(hero, session, false));
    }
    let rows: Vec<Row> = state
        .catalogue
        .rows()
        .into_iter()
        .map(|(heading, movies)| Row {
            heading,
            cards: movies
                .into_iter()
                .map(|movie| Card::new(movie, session, false))
                .collect(),
        })
        .collect();
    ctx.insert("rows", &rows);
    ctx
}

#[derive(Deserialize)]
struct HomeParams {
    modal: Option<String>,
}

async fn index(
    req: HttpRequest,
    params: web::Query<HomeParams>,
    id: Identity,
    tera: Tera,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let visit = page_visit(&id, &db)?;
    let modals = Modals::parse(params.modal.as_deref());
    let ctx = home_context(&state, &here(&req), &visit, modals);
    render(&tera, "index.html", &ctx)
}

#[derive(Serialize)]
struct FilterButton<'a> {
    label: &'a str,
    active: bool,
}

#[derive(Deserialize)]
struct BrowseParams {
    genero: Option<String>,
}

async fn browse(
    req: HttpRequest,
    params: web::Query<BrowseParams>,
    id: Identity,
    tera: Tera,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let visit = page_visit(&id, &db)?;
    let filter = Filter::parse(params.genero.as_deref());
    debug!("Browsing with filter {:?}", filter);
    let cards: Vec<Card> = filter
        .apply(state.catalogue.iter())
        .into_iter()
        .map(|(movie, shown)| Card::new(movie, &visit.session, !shown))
        .collect();
    let filters: Vec<FilterButton> = GENRE_FILTERS
        .iter()
        .map(|label| FilterButton {
            label,
            active: *label == filter.label(),
        })
        .collect();
    let mut ctx = page_context(&here(&req), &visit, Modals::default());
    ctx.insert("cards", &cards);
    ctx.insert("filters", &filters);
    render(&tera, "browse.html", &ctx)
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search(
    req: HttpRequest,
    params: web::Query<SearchParams>,
    id: Identity,
    tera: Tera,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let visit = page_visit(&id, &db)?;
    let outcome = interaction::search(&state.catalogue, &params.q);
    let mut modals = Modals::default();
    modals.show(Modal::Search);
    let mut ctx = home_context(&state, &here(&req), &visit, modals);
    ctx.insert("query", &params.q);
    ctx.insert("results", outcome.hits());
    ctx.insert("search_message", &outcome.message());
    render(&tera, "index.html", &ctx)
}

fn registration_failed(
    tera: &tera::Tera,
    state: &AppState,
    visit: &Visit,
    form: &RegistrationForm,
    errors: &ValidationErrors,
) -> actix_web::Result<HttpResponse> {
    debug!("Registration rejected: {}", errors);
    let mut modals = Modals::default();
    modals.show(Modal::Register);
    let mut ctx = home_context(state, "/", visit, modals);
    ctx.insert("errors", errors);
    ctx.insert(
        "prefill",
        &Prefill {
            username: &form.username,
            email: &form.email,
        },
    );
    render(tera, "index.html", &ctx)
}

async fn register(
    form: web::Form<RegistrationForm>,
    id: Identity,
    tera: Tera,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(&id, &db)?;
    let visit = db
        .get_visit(visitor)
        .map_err(|err| log_error(err, "Database error"))?;
    if let Err(errors) = visit.session.validate(&form) {
        return registration_failed(&tera, &state, &visit, &form, &errors);
    }

    let password = form.password.clone();
    let cost = state.config.bcrypt_cost;
    let password_hash = web::block(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| log_error(err, "Hashing error"))?
        .map_err(|err| log_error(err, "Hashing error"))?;

    let registered = db
        .update_visit(visitor, |visit| {
            visit
                .session
                .register(&form, password_hash.clone())
                .map(|user| user.username.clone())
        })
        .map_err(|err| log_error(err, "Database error"))?;
    let visit = take_visit(&db, visitor)?;
    match registered {
        Ok(username) => {
            info!("Registered user {}", username);
            let mut modals = Modals::default();
            modals.show(Modal::Register);
            let mut ctx = home_context(&state, "/", &visit, modals);
            ctx.insert("success", REGISTERED_NOTICE);
            ctx.insert(
                "refresh_after",
                &state.config.success_delay.as_secs_f64(),
            );
            render(&tera, "index.html", &ctx)
        }
        Err(errors) => registration_failed(&tera, &state, &visit, &form, &errors),
    }
}

#[derive(Deserialize)]
struct LoginParams {
    username: String,
    password: String,
}

async fn login(
    params: web::Form<LoginParams>,
    id: Identity,
    db: Db,
) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(&id, &db)?;
    let visit = db
        .get_visit(visitor)
        .map_err(|err| log_error(err, "Database error"))?;
    let stored_hash = visit
        .session
        .users()
        .iter()
        .find(|user| user.username == params.username)
        .map(|user| user.password_hash.clone());
    if let Some(stored_hash) = stored_hash {
        let password = params.password.clone();
        let hash = stored_hash.clone();
        let verified = web::block(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|err| log_error(err, "Verification error"))?
            .map_err(|err| log_error(err, "Verification error"))?;
        if verified {
            let logged_in = db
                .update_visit(visitor, |visit| {
                    visit
                        .session
                        .login(&params.username, |user| user.password_hash == stored_hash)
                        .is_ok()
                })
                .map_err(|err| log_error(err, "Database error"))?;
            if logged_in {
                info!("User {} logged in", params.username);
                return Ok(redirect("/"));
            }
        }
    }
    set_notice(&db, visitor, "Usuario o contraseña incorrectos")?;
    Ok(redirect("/?modal=registro"))
}

async fn logout(id: Identity, db: Db) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(&id, &db)?;
    db.update_visit(visitor, |visit| visit.session.logout())
        .map_err(|err| log_error(err, "Database error"))?;
    Ok(redirect("/"))
}

#[derive(Deserialize)]
struct ReturnTo {
    #[serde(default)]
    volver: String,
}

fn toggle_shelf(
    shelf: Shelf,
    movie_id: &str,
    back: &str,
    id: &Identity,
    db: &sled::Db,
    state: &AppState,
) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(id, db)?;
    let back = local_path(back);
    let title = match state.catalogue.get(movie_id) {
        Some(movie) => movie.title,
        None => return Ok(redirect(back)),
    };
    let toggled = db
        .update_visit(visitor, |visit| {
            let toggled = visit.session.toggle(shelf, title);
            if let Err(err) = &toggled {
                visit.notice = Some(err.prompt().to_owned());
            }
            toggled
        })
        .map_err(|err| log_error(err, "Database error"))?;
    match toggled {
        Ok(membership) => {
            info!("{:?} {} -> {}", shelf, title, membership.label());
            Ok(redirect(back))
        }
        Err(_) => Ok(redirect("/?modal=registro")),
    }
}

async fn toggle_list(
    path: web::Path<String>,
    form: web::Form<ReturnTo>,
    id: Identity,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    toggle_shelf(Shelf::List, &path, &form.volver, &id, &db, &state)
}

async fn toggle_like(
    path: web::Path<String>,
    form: web::Form<ReturnTo>,
    id: Identity,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    toggle_shelf(Shelf::Likes, &path, &form.volver, &id, &db, &state)
}

async fn select(path: web::Path<String>, id: Identity, db: Db) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(&id, &db)?;
    let movie_id = path.into_inner();
    debug!("Visitor {} selected {}", visitor, movie_id);
    db.update_visit(visitor, |visit| visit.selected = Some(movie_id.clone()))
        .map_err(|err| log_error(err, "Database error"))?;
    Ok(redirect("/detalle"))
}

async fn detail(
    req: HttpRequest,
    id: Identity,
    tera: Tera,
    db: Db,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let visit = page_visit(&id, &db)?;
    let view = DetailView::new(&state.catalogue, visit.selected.as_deref(), &visit.session);
    let mut ctx = page_context(&here(&req), &visit, Modals::default());
    let body = view
        .render(&tera, &mut ctx)
        .map_err(|err| log_error(err, "Template error"))?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

async fn play(
    path: web::Path<String>,
    form: web::Form<ReturnTo>,
    id: Identity,
    db: Db,
) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(&id, &db)?;
    debug!("Play {}", path.as_str());
    set_notice(&db, visitor, PLAY_NOTICE)?;
    Ok(redirect(local_path(&form.volver)))
}

async fn more_info(
    path: web::Path<String>,
    form: web::Form<ReturnTo>,
    id: Identity,
    db: Db,
) -> actix_web::Result<HttpResponse> {
    let visitor = visitor(&id, &db)?;
    debug!("Info {}", path.as_str());
    set_notice(&db, visitor, INFO_NOTICE)?;
    Ok(redirect(local_path(&form.volver)))
}

#[derive(Deserialize)]
struct CloseParams {
    modal: Option<String>,
    #[serde(default)]
    fondo: bool,
}

/// Close button and backdrop of a modal. Closing the search modal also drops
/// the query and its results, since the home page is rendered without them.
async fn close_modal(params: web::Query<CloseParams>) -> HttpResponse {
    let mut modals = Modals::parse(params.modal.as_deref());
    if let Some(modal) = params.modal.as_deref().and_then(Modal::from_name) {
        if params.fondo {
            modals.click(modal, true);
        } else {
            modals.hide(modal);
        }
    }
    redirect(&modals.location())
}
