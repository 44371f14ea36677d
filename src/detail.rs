use crate::catalogue::{Catalogue, NOT_FOUND};
use crate::interaction::select_link;
use crate::model::Movie;
use crate::session::{SessionState, Shelf};
use serde::Serialize;

#[derive(Serialize, Debug, PartialEq)]
pub struct SimilarMovie {
    pub id: &'static str,
    pub title: &'static str,
    pub image: &'static str,
    pub link: String,
}

/// Everything the detail page shows for the selected movie.
#[derive(Serialize, Debug)]
pub struct DetailView {
    pub movie: &'static Movie,
    pub found: bool,
    pub meta: Vec<&'static str>,
    pub similar: Vec<SimilarMovie>,
    pub list_label: &'static str,
    pub like_label: &'static str,
}

impl DetailView {
    /// Unknown or missing ids render the placeholder record.
    pub fn new(catalogue: &Catalogue, selected: Option<&str>, session: &SessionState) -> DetailView {
        let movie = catalogue.get_or_placeholder(selected.unwrap_or_default());
        let meta = [movie.year, movie.duration, movie.rating]
            .iter()
            .copied()
            .filter(|part| !part.is_empty())
            .collect();
        let similar = catalogue
            .similar(movie)
            .into_iter()
            .map(|other| SimilarMovie {
                id: other.id,
                title: other.title,
                image: other.image,
                link: select_link(other),
            })
            .collect();
        DetailView {
            movie,
            found: !std::ptr::eq(movie, &NOT_FOUND),
            meta,
            similar,
            list_label: session.membership(Shelf::List, movie.title).label(),
            like_label: session.membership(Shelf::Likes, movie.title).label(),
        }
    }

    pub fn render(&self, tera: &tera::Tera, ctx: &mut tera::Context) -> tera::Result<String> {
        ctx.insert("detail", self);
        tera.render("detail.html", ctx)
    }
}
