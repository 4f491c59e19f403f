use std::fmt;
use std::sync::Arc;

use identity_sdk::proto::{
    EmailLoginRequest, EmailLoginResponse, GetUserByTokenRequest, GetUserByTokenResponse,
    GetUserRequest, GetUserResponse, GetUsersRequest, GetUsersResponse, UpdateUserRequest,
    UpdateUserResponse,
};
use identity_sdk::{ProfileUpdate, UserService};
use market_transport_grpc::respond;
use tonic::{Request, Response, Status};

use crate::domain::service::IdentityService;

/// `UserService` adapter; every handler funnels through [`respond`].
#[derive(Clone)]
pub struct UserServiceImpl {
    service: Arc<IdentityService>,
}

impl UserServiceImpl {
    pub fn new(service: Arc<IdentityService>) -> Self {
        Self { service }
    }
}

/// Logged in place of a token request so credentials stay out of logs.
struct RedactedToken(usize);

impl fmt::Debug for RedactedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GetUserByTokenRequest {{ token: <{} bytes> }}", self.0)
    }
}

/// Login request as logged: the password is never printed.
struct RedactedLogin<'a>(&'a EmailLoginRequest);

impl fmt::Debug for RedactedLogin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmailLoginRequest {{ email: {:?}, password: <redacted> }}", self.0.email)
    }
}

fn profile_update(req: UpdateUserRequest) -> ProfileUpdate {
    ProfileUpdate {
        id: req.id,
        actor_id: req.user_id,
        name: req.name,
        avatar: req.avatar,
        summary: req.summary,
        password: Some(req.password).filter(|p| !p.is_empty()),
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .service
            .get_user(&req.user_id)
            .await
            .map(|user| GetUserResponse {
                status: None,
                user: Some(user.into()),
            });
        respond("GetUser", &req, result)
    }

    async fn get_users(
        &self,
        request: Request<GetUsersRequest>,
    ) -> Result<Response<GetUsersResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .service
            .get_users(&req.user_ids)
            .await
            .map(|users| GetUsersResponse {
                status: None,
                users: users.into_iter().map(Into::into).collect(),
            });
        respond("GetUsers", &req, result)
    }

    async fn get_user_by_token(
        &self,
        request: Request<GetUserByTokenRequest>,
    ) -> Result<Response<GetUserByTokenResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .service
            .get_user_by_token(&req.token)
            .await
            .map(|user| GetUserByTokenResponse {
                status: None,
                user: Some(user.into()),
            });
        respond("GetUserByToken", &RedactedToken(req.token.len()), result)
    }

    async fn email_login(
        &self,
        request: Request<EmailLoginRequest>,
    ) -> Result<Response<EmailLoginResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .service
            .email_login(&req.email, &req.password)
            .await
            .map(|outcome| EmailLoginResponse {
                status: None,
                user: Some(outcome.user.into()),
                token: outcome.token,
            });
        respond("EmailLogin", &RedactedLogin(&req), result)
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        let update = profile_update(request.into_inner());
        let logged = update.clone();
        let result = self
            .service
            .update_user(update)
            .await
            .map(|user| UpdateUserResponse {
                status: None,
                user: Some(user.into()),
            });
        respond("UpdateUser", &logged, result)
    }
}
