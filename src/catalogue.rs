use crate::model::Movie;
use std::collections::HashMap;

/// Shown on the detail page when the selected id is not in the catalogue.
pub static NOT_FOUND: Movie = Movie {
    id: "",
    title: "Película no encontrada",
    year: "",
    duration: "",
    rating: "",
    description: "La película que buscas no está disponible en nuestro catálogo.",
    director: "",
    cast: "",
    genre: "",
    release: "",
    classification: "",
    tags: &["Error", "Desconocida"],
    image: "img/placeholder.jpg",
    trailer: "",
};

/// Filter buttons of the browse page, in display order.
pub const GENRE_FILTERS: &[&str] = &[
    "Todas",
    "Acción",
    "Drama",
    "Comedia",
    "Ciencia Ficción",
    "Terror",
    "Animación",
];

/// Rows of the home page as (heading, movie ids).
pub const ROWS: &[(&str, &[&str])] = &[
    (
        "Tendencias ahora",
        &["pelicula1", "pelicula5", "pelicula9", "pelicula14", "pelicula11"],
    ),
    (
        "Clásicos imprescindibles",
        &["pelicula2", "pelicula6", "pelicula8", "pelicula3", "pelicula15"],
    ),
    (
        "Para pasar un buen rato",
        &["pelicula7", "pelicula12", "pelicula4", "pelicula10", "pelicula13"],
    ),
];

static MOVIES: &[Movie] = &[
    Movie {
        id: "pelicula1",
        title: "Gladiador",
        year: "2000",
        duration: "2h 35min",
        rating: "★★★★★",
        description: "Un general romano traicionado cae en la esclavitud y lucha como gladiador para vengar a su familia.",
        director: "Ridley Scott",
        cast: "Russell Crowe, Joaquin Phoenix, Connie Nielsen",
        genre: "Acción",
        release: "5 de mayo de 2000",
        classification: "+16",
        tags: &["Épica", "Historia", "Venganza"],
        image: "img/pelicula1.jpg",
        trailer: "https://www.youtube.com/results?search_query=gladiador+trailer",
    },
    Movie {
        id: "pelicula2",
        title: "El Padrino",
        year: "1972",
        duration: "2h 55min",
        rating: "★★★★★",
        description: "El patriarca de una familia mafiosa transfiere el control de su imperio a su reacio hijo menor.",
        director: "Francis Ford Coppola",
        cast: "Marlon Brando, Al Pacino, James Caan",
        genre: "Drama",
        release: "24 de marzo de 1972",
        classification: "+18",
        tags: &["Mafia", "Familia", "Clásico"],
        image: "img/pelicula2.jpg",
        trailer: "https://www.youtube.com/results?search_query=el+padrino+trailer",
    },
    Movie {
        id: "pelicula3",
        title: "Toy Story",
        year: "1995",
        duration: "1h 21min",
        rating: "★★★★☆",
        description: "Un vaquero de juguete ve amenazado su lugar como favorito cuando llega un flamante guardián espacial.",
        director: "John Lasseter",
        cast: "Tom Hanks, Tim Allen, Annie Potts",
        genre: "Animación",
        release: "22 de noviembre de 1995",
        classification: "Todos los públicos",
        tags: &["Familiar", "Amistad", "Juguetes"],
        image: "img/pelicula3.jpg",
        trailer: "https://www.youtube.com/results?search_query=toy+story+trailer",
    },
    Movie {
        id: "pelicula4",
        title: "Mad Max: Furia en la carretera",
        year: "2015",
        duration: "2h 0min",
        rating: "★★★★☆",
        description: "En un desierto postapocalíptico, una guerrera huye de un tirano con la ayuda de un vagabundo.",
        director: "George Miller",
        cast: "Tom Hardy, Charlize Theron, Nicholas Hoult",
        genre: "Acción",
        release: "15 de mayo de 2015",
        classification: "+16",
        tags: &["Persecución", "Desierto", "Supervivencia"],
        image: "img/pelicula4.jpg",
        trailer: "https://www.youtube.com/results?search_query=mad+max+fury+road+trailer",
    },
    Movie {
        id: "pelicula5",
        title: "Interestelar",
        year: "2014",
        duration: "2h 49min",
        rating: "★★★★★",
        description: "Un grupo de exploradores atraviesa un agujero de gusano en busca de un nuevo hogar para la humanidad.",
        director: "Christopher Nolan",
        cast: "Matthew McConaughey, Anne Hathaway, Jessica Chastain",
        genre: "Ciencia Ficción",
        release: "7 de noviembre de 2014",
        classification: "+12",
        tags: &["Espacio", "Tiempo", "Familia"],
        image: "img/pelicula5.jpg",
        trailer: "https://www.youtube.com/results?search_query=interstellar+trailer",
    },
    Movie {
        id: "pelicula6",
        title: "El resplandor",
        year: "1980",
        duration: "2h 26min",
        rating: "★★★★☆",
        description: "Un escritor acepta cuidar un hotel aislado durante el invierno y su cordura empieza a quebrarse.",
        director: "Stanley Kubrick",
        cast: "Jack Nicholson, Shelley Duvall, Danny Lloyd",
        genre: "Terror",
        release: "23 de mayo de 1980",
        classification: "+18",
        tags: &["Psicológico", "Hotel", "Clásico"],
        image: "img/pelicula6.jpg",
        trailer: "https://www.youtube.com/results?search_query=the+shining+trailer",
    },
    Movie {
        id: "pelicula7",
        title: "Supercool",
        year: "2007",
        duration: "1h 53min",
        rating: "★★★☆☆",
        description: "Dos amigos inseparables intentan conseguir alcohol para una fiesta antes de separarse para ir a la universidad.",
        director: "Greg Mottola",
        cast: "Jonah Hill, Michael Cera, Christopher Mintz-Plasse",
        genre: "Comedia",
        release: "17 de agosto de 2007",
        classification: "+16",
        tags: &["Adolescentes", "Amistad", "Fiesta"],
        image: "img/pelicula7.jpg",
        trailer: "https://www.youtube.com/results?search_query=superbad+trailer",
    },
    Movie {
        id: "pelicula8",
        title: "Forrest Gump",
        year: "1994",
        duration: "2h 22min",
        rating: "★★★★★",
        description: "Un hombre de corazón noble atraviesa sin proponérselo varias décadas de la historia de Estados Unidos.",
        director: "Robert Zemeckis",
        cast: "Tom Hanks, Robin Wright, Gary Sinise",
        genre: "Drama",
        release: "6 de julio de 1994",
        classification: "+12",
        tags: &["Vida", "Historia", "Amor"],
        image: "img/pelicula8.jpg",
        trailer: "https://www.youtube.com/results?search_query=forrest+gump+trailer",
    },
    Movie {
        id: "pelicula9",
        title: "Coco",
        year: "2017",
        duration: "1h 45min",
        rating: "★★★★★",
        description: "Un niño que sueña con ser músico viaja a la Tierra de los Muertos para descubrir la historia de su familia.",
        director: "Lee Unkrich",
        cast: "Anthony Gonzalez, Gael García Bernal, Benjamin Bratt",
        genre: "Animación",
        release: "22 de noviembre de 2017",
        classification: "Todos los públicos",
        tags: &["Música", "Familia", "México"],
        image: "img/pelicula9.jpg",
        trailer: "https://www.youtube.com/results?search_query=coco+trailer",
    },
    Movie {
        id: "pelicula10",
        title: "Blade Runner 2049",
        year: "2017",
        duration: "2h 44min",
        rating: "★★★★☆",
        description: "Un nuevo blade runner desentierra un secreto que podría sumir en el caos lo que queda de la sociedad.",
        director: "Denis Villeneuve",
        cast: "Ryan Gosling, Harrison Ford, Ana de Armas",
        genre: "Ciencia Ficción",
        release: "6 de octubre de 2017",
        classification: "+16",
        tags: &["Distopía", "Replicantes", "Neo-noir"],
        image: "img/pelicula10.jpg",
        trailer: "https://www.youtube.com/results?search_query=blade+runner+2049+trailer",
    },
    Movie {
        id: "pelicula11",
        title: "John Wick",
        year: "2014",
        duration: "1h 41min",
        rating: "★★★★☆",
        description: "Un asesino retirado vuelve al oficio para vengarse de los mafiosos que le arrebataron lo último que tenía.",
        director: "Chad Stahelski",
        cast: "Keanu Reeves, Michael Nyqvist, Willem Dafoe",
        genre: "Acción",
        release: "24 de octubre de 2014",
        classification: "+18",
        tags: &["Venganza", "Crimen", "Artes marciales"],
        image: "img/pelicula11.jpg",
        trailer: "https://www.youtube.com/results?search_query=john+wick+trailer",
    },
    Movie {
        id: "pelicula12",
        title: "¿Qué pasó ayer?",
        year: "2009",
        duration: "1h 40min",
        rating: "★★★☆☆",
        description: "Tres amigos despiertan en Las Vegas sin recordar nada de la despedida de soltero y sin rastro del novio.",
        director: "Todd Phillips",
        cast: "Bradley Cooper, Ed Helms, Zach Galifianakis",
        genre: "Comedia",
        release: "5 de junio de 2009",
        classification: "+16",
        tags: &["Las Vegas", "Amistad", "Resaca"],
        image: "img/pelicula12.jpg",
        trailer: "https://www.youtube.com/results?search_query=the+hangover+trailer",
    },
    Movie {
        id: "pelicula13",
        title: "El conjuro",
        year: "2013",
        duration: "1h 52min",
        rating: "★★★★☆",
        description: "Una pareja de investigadores paranormales ayuda a una familia aterrorizada por una presencia en su granja.",
        director: "James Wan",
        cast: "Vera Farmiga, Patrick Wilson, Lili Taylor",
        genre: "Terror",
        release: "19 de julio de 2013",
        classification: "+16",
        tags: &["Sobrenatural", "Casa encantada", "Basada en hechos"],
        image: "img/pelicula13.jpg",
        trailer: "https://www.youtube.com/results?search_query=the+conjuring+trailer",
    },
    Movie {
        id: "pelicula14",
        title: "Dune",
        year: "2021",
        duration: "2h 35min",
        rating: "★★★★☆",
        description: "El heredero de una casa noble llega al planeta desértico Arrakis, fuente de la sustancia más valiosa del universo.",
        director: "Denis Villeneuve",
        cast: "Timothée Chalamet, Rebecca Ferguson, Zendaya",
        genre: "Ciencia Ficción",
        release: "22 de octubre de 2021",
        classification: "+12",
        tags: &["Desierto", "Imperio", "Profecía"],
        image: "img/pelicula14.jpg",
        trailer: "https://www.youtube.com/results?search_query=dune+2021+trailer",
    },
    Movie {
        id: "pelicula15",
        title: "Parásitos",
        year: "2019",
        duration: "2h 12min",
        rating: "★★★★★",
        description: "Una familia sin recursos se infiltra poco a poco en la vida de una familia adinerada.",
        director: "Bong Joon-ho",
        cast: "Song Kang-ho, Lee Sun-kyun, Cho Yeo-jeong",
        genre: "Drama",
        release: "30 de mayo de 2019",
        classification: "+16",
        tags: &["Clases sociales", "Suspense", "Corea"],
        image: "img/pelicula15.jpg",
        trailer: "https://www.youtube.com/results?search_query=parasite+trailer",
    },
];

/// Read-only movie store, keyed by id and iterable in catalogue order.
pub struct Catalogue {
    movies: &'static [Movie],
    by_id: HashMap<&'static str, usize>,
}

impl Catalogue {
    pub fn builtin() -> Catalogue {
        Catalogue::new(MOVIES)
    }

    pub fn new(movies: &'static [Movie]) -> Catalogue {
        let by_id = movies
            .iter()
            .enumerate()
            .map(|(index, movie)| (movie.id, index))
            .collect();
        Catalogue { movies, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'static Movie> {
        self.by_id.get(id).map(|index| &self.movies[*index])
    }

    pub fn get_or_placeholder(&self, id: &str) -> &'static Movie {
        self.get(id).unwrap_or(&NOT_FOUND)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Movie> {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Movies sharing the genre of `movie`, without `movie` itself.
    pub fn similar(&self, movie: &Movie) -> Vec<&'static Movie> {
        if movie.genre.is_empty() {
            return Vec::new();
        }
        self.iter()
            .filter(|other| other.genre == movie.genre && other.id != movie.id)
            .collect()
    }

    /// Resolves the home page rows, dropping ids the catalogue lacks.
    pub fn rows(&self) -> Vec<(&'static str, Vec<&'static Movie>)> {
        ROWS.iter()
            .map(|(heading, ids)| (*heading, ids.iter().filter_map(|id| self.get(id)).collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let catalogue = Catalogue::builtin();
        let ids: HashSet<_> = catalogue.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 15);
        assert_eq!(catalogue.len(), 15);
        for n in 1..=15 {
            assert!(catalogue.get(&format!("pelicula{}", n)).is_some());
        }
    }

    #[test]
    fn unknown_id_falls_back_to_placeholder() {
        let catalogue = Catalogue::builtin();
        assert!(catalogue.get("pelicula99").is_none());
        let movie = catalogue.get_or_placeholder("pelicula99");
        assert_eq!(movie.title, "Película no encontrada");
        assert_eq!(movie.tags, &["Error", "Desconocida"]);
    }

    #[test]
    fn similar_keeps_catalogue_order() {
        let catalogue = Catalogue::builtin();
        let movie = catalogue.get("pelicula5").unwrap();
        let similar: Vec<_> = catalogue.similar(movie).iter().map(|m| m.id).collect();
        assert_eq!(similar, vec!["pelicula10", "pelicula14"]);
    }

    #[test]
    fn placeholder_has_no_similar_movies() {
        let catalogue = Catalogue::builtin();
        assert!(catalogue.similar(&NOT_FOUND).is_empty());
    }

    #[test]
    fn rows_resolve_every_id() {
        let catalogue = Catalogue::builtin();
        for (_, movies) in catalogue.rows() {
            assert_eq!(movies.len(), 5);
        }
    }

    #[test]
    fn filter_labels_cover_catalogue_genres() {
        let catalogue = Catalogue::builtin();
        for movie in catalogue.iter() {
            assert!(GENRE_FILTERS.contains(&movie.genre), "{}", movie.genre);
        }
    }
}
