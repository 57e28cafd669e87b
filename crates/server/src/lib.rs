use std::sync::Arc;

use db::DBService;
use utils_jwt::JwtService;

pub mod error;
pub mod http;
pub mod middleware;
pub mod password;
pub mod routes;

#[cfg(test)]
pub mod test_support;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(db: DBService, jwt: JwtService) -> Self {
        Self {
            db,
            jwt: Arc::new(jwt),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
