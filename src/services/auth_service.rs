use crate::database::DataStore;
use crate::models::{Role, User};
use crate::utils::ident::{doc_id_string, id_filter_candidates};
use crate::utils::AppError;
use actix_web::{HttpMessage, HttpRequest};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, from_document, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "clubId", default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub club_name: String,
    pub head: String,
    pub description: String,
    #[serde(default)]
    pub contact_links: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "clubId")]
    pub club_id: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub success: bool,
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "your-secret-key".to_string())
}

fn college_email_domain() -> String {
    std::env::var("COLLEGE_EMAIL_DOMAIN").unwrap_or_else(|_| "@mitwpu.edu.in".to_string())
}

fn default_director_email() -> String {
    std::env::var("DEFAULT_DIRECTOR_EMAIL")
        .unwrap_or_else(|_| "director@mitwpu.edu.in".to_string())
        .to_lowercase()
}

fn default_director_password() -> String {
    std::env::var("DEFAULT_DIRECTOR_PASSWORD").unwrap_or_else(|_| "Director@123".to_string())
}

// Generate JWT token (7-day expiry)
pub fn generate_jwt(
    user_id: &str,
    email: &str,
    role: Role,
    club_id: Option<&str>,
) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::days(7)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        club_id: club_id.map(str::to_string),
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

/// Claims placed in request extensions by the auth middleware, checked
/// against the role the endpoint requires.
pub fn require_role(req: &HttpRequest, role: Role) -> Result<Claims, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    if claims.role != role {
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }

    Ok(claims)
}

// User login
pub async fn login(store: &DataStore, request: &LoginRequest) -> Result<LoginResponse, AppError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let normalized_email = request.email.to_lowercase();
    let domain = college_email_domain();
    if !normalized_email.ends_with(&domain) {
        return Err(AppError::BadRequest(format!(
            "Use your college email ({})",
            domain
        )));
    }

    let mut user_doc = store
        .find_one("users", doc! { "email": &normalized_email })
        .await?;

    // First director login bootstraps the account
    if user_doc.is_none() && normalized_email == default_director_email() {
        let hashed = hash(default_director_password(), DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        let mut director = doc! {
            "email": &normalized_email,
            "password": &hashed,
            "role": Role::Director.as_str(),
            "createdAt": BsonDateTime::now(),
        };
        let id = store.insert_one("users", director.clone()).await?;
        director.insert("_id", id);
        log::info!("👤 Seeded default director account: {}", normalized_email);
        user_doc = Some(director);
    }

    let user_doc =
        user_doc.ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;
    let mut user: User =
        from_document(user_doc).map_err(|e| AppError::Database(e.to_string()))?;

    let password_matches = verify(&request.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
    if !password_matches {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if user.role == Role::Club {
        let club = store
            .find_one("clubs", doc! { "email": &normalized_email })
            .await?
            .filter(|club| club.get_bool("approved").unwrap_or(false))
            .ok_or_else(|| AppError::Forbidden("Club not approved yet".to_string()))?;

        // Backfill the club reference for accounts created before approval
        if user.club_id.is_none() {
            let club_id = doc_id_string(&club);
            store
                .update_one_any(
                    "users",
                    &id_filter_candidates(&user.id_string()),
                    doc! { "$set": { "clubId": &club_id } },
                )
                .await?;
            user.club_id = Some(club_id);
        }
    }

    let token = generate_jwt(
        &user.id_string(),
        &user.email,
        user.role,
        user.club_id.as_deref(),
    )?;

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserInfo {
            id: user.id_string(),
            email: user.email,
            role: user.role,
            club_id: user.club_id,
        },
    })
}

// Club registration: pending club + its user account
pub async fn register(
    store: &DataStore,
    request: &RegisterRequest,
) -> Result<RegisterResponse, AppError> {
    if request.email.is_empty()
        || request.password.is_empty()
        || request.club_name.is_empty()
        || request.head.is_empty()
        || request.description.is_empty()
    {
        return Err(AppError::BadRequest(
            "All required fields must be provided".to_string(),
        ));
    }

    let normalized_email = request.email.to_lowercase();
    let domain = college_email_domain();
    if !normalized_email.ends_with(&domain) {
        return Err(AppError::BadRequest(format!(
            "Use your college email ({})",
            domain
        )));
    }

    if store
        .find_one("users", doc! { "email": &normalized_email })
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    if store
        .find_one("clubs", doc! { "name": &request.club_name })
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Club name already taken".to_string()));
    }

    let hashed_password = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let contact_links: Vec<String> = request
        .contact_links
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect();

    let user_id = store
        .insert_one(
            "users",
            doc! {
                "email": &normalized_email,
                "password": &hashed_password,
                "role": Role::Club.as_str(),
                "club_name": &request.club_name,
                "createdAt": BsonDateTime::now(),
            },
        )
        .await?;

    // Club starts unapproved; color is assigned on approval
    let club_id = store
        .insert_one(
            "clubs",
            doc! {
                "name": &request.club_name,
                "head": &request.head,
                "description": &request.description,
                "color": mongodb::bson::Bson::Null,
                "members": [],
                "events": [],
                "approved": false,
                "email": &normalized_email,
                "contact_links": contact_links,
                "createdAt": BsonDateTime::now(),
            },
        )
        .await?;

    store
        .update_one_any(
            "users",
            &id_filter_candidates(&user_id),
            doc! { "$set": { "clubId": &club_id } },
        )
        .await?;

    log::info!(
        "✅ Club registered (pending approval): {} <{}>",
        request.club_name,
        normalized_email
    );

    Ok(RegisterResponse {
        message: "Registration submitted successfully. Wait for director approval.".to_string(),
        success: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(email: &str, club_name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "Secret@123".to_string(),
            club_name: club_name.to_string(),
            head: "Priya Rao".to_string(),
            description: "Robotics and automation".to_string(),
            contact_links: Some("https://x.test/a, https://x.test/b".to_string()),
        }
    }

    #[test]
    fn jwt_roundtrip_preserves_claims() {
        let token = generate_jwt("user-1", "tech@mitwpu.edu.in", Role::Club, Some("club-9"))
            .expect("token");
        let claims = verify_token(&token).expect("claims");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Club);
        assert_eq!(claims.club_id.as_deref(), Some("club-9"));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(verify_token("not.a.jwt").is_err());
    }

    #[tokio::test]
    async fn register_rejects_wrong_domain_and_duplicates() {
        let store = DataStore::mock();

        let err = register(&store, &register_request("tech@gmail.com", "Tech Club"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        register(&store, &register_request("tech@mitwpu.edu.in", "Tech Club"))
            .await
            .expect("first registration");

        let err = register(&store, &register_request("tech@mitwpu.edu.in", "Other Club"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Email already registered"));

        let err = register(&store, &register_request("other@mitwpu.edu.in", "Tech Club"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Club name already taken"));
    }

    #[tokio::test]
    async fn club_login_is_blocked_until_approval() {
        let store = DataStore::mock();
        register(&store, &register_request("tech@mitwpu.edu.in", "Tech Club"))
            .await
            .expect("registration");

        let request = LoginRequest {
            email: "tech@mitwpu.edu.in".to_string(),
            password: "Secret@123".to_string(),
        };

        let err = login(&store, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref msg) if msg == "Club not approved yet"));

        store
            .update_one(
                "clubs",
                doc! { "email": "tech@mitwpu.edu.in" },
                doc! { "$set": { "approved": true } },
            )
            .await
            .unwrap();

        let response = login(&store, &request).await.expect("login");
        assert_eq!(response.user.role, Role::Club);
        assert!(response.user.club_id.is_some());

        let claims = verify_token(&response.token).expect("claims");
        assert_eq!(claims.club_id, response.user.club_id);
    }

    #[tokio::test]
    async fn first_director_login_bootstraps_the_account() {
        let store = DataStore::mock();

        let request = LoginRequest {
            email: "director@mitwpu.edu.in".to_string(),
            password: "Director@123".to_string(),
        };

        let response = login(&store, &request).await.expect("bootstrap login");
        assert_eq!(response.user.role, Role::Director);

        // Second login goes through the stored hash
        let response = login(&store, &request).await.expect("second login");
        assert_eq!(response.user.role, Role::Director);

        let err = login(
            &store,
            &LoginRequest {
                email: "director@mitwpu.edu.in".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
