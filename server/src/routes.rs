use axum::{Router, middleware, routing::get};

use forumgate_core::middleware::{optional_auth, request_log};
use forumgate_email::handler as email;
use forumgate_embed::handler as embed;

use crate::prelude::*;

fn init_email(app: &App) -> Router<App> {
	Router::new()
		.route("/email/unsubscribe/{key}", get(email::get_unsubscribe).post(email::post_unsubscribe))
		.route("/email/unsubscribed", get(email::get_unsubscribed))
		.route("/email/preferences", get(email::get_preferences))
		.route_layer(middleware::from_fn_with_state(app.clone(), optional_auth))
}

fn init_embed() -> Router<App> {
	Router::new()
		.route("/embed/comments", get(embed::get_comments))
		.route("/embed/info", get(embed::get_info))
}

pub fn init(app: App) -> Router {
	Router::new()
		.merge(init_email(&app))
		.merge(init_embed())
		.layer(middleware::from_fn(request_log))
		.with_state(app)
}

// vim: ts=4
