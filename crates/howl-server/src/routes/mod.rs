mod index;

use rocket::{routes, Route};

pub fn routes() -> Vec<Route> {
    routes![index::show_form, index::upload]
}
