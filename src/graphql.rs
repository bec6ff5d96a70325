// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GraphQL transport for the GitHub v4 API.
///
/// Requests are plain query documents plus a JSON variables object. The
/// [`GraphQlExecutor`] trait is the seam between the report generator and
/// the network; production code uses [`OctocrabExecutor`].
use std::{fs, future::Future, path::Path};

use octocrab::Octocrab;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, io_error};

/// One GraphQL request.
#[derive(Debug, Clone, Serialize,)]
pub struct GraphQlRequest
{
    /// Operation name used in diagnostics; not sent to the endpoint.
    #[serde(skip)]
    pub operation: &'static str,
    /// Query document.
    pub query:     &'static str,
    /// Variables referenced by the query.
    pub variables: Value,
}

/// Executes GraphQL requests and returns the raw response body.
pub trait GraphQlExecutor
{
    /// Sends `request` and returns the response document, which carries
    /// `data` and optionally `errors`.
    fn execute(&self, request: &GraphQlRequest,) -> impl Future<Output = Result<Value, Error,>,> + Send;
}

/// [`GraphQlExecutor`] backed by an authenticated [`Octocrab`] client.
#[derive(Debug, Clone,)]
pub struct OctocrabExecutor
{
    client: Octocrab,
}

impl OctocrabExecutor
{
    /// Builds a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when the client cannot be constructed.
    pub fn new(token: &str,) -> Result<Self, Error,>
    {
        let client = Octocrab::builder()
            .personal_token(token,)
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)?;
        Ok(Self {
            client,
        },)
    }

    /// Builds a client from a token file; surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Validation`] when it is empty.
    pub fn from_token_file(path: &Path,) -> Result<Self, Error,>
    {
        let token = read_token(path,)?;
        Self::new(&token,)
    }
}

impl GraphQlExecutor for OctocrabExecutor
{
    async fn execute(&self, request: &GraphQlRequest,) -> Result<Value, Error,>
    {
        debug!("Sending GraphQL operation {}", request.operation);
        let response: Value = self.client.graphql(request,).await?;
        Ok(response,)
    }
}

/// Reads the API token stored in `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::Validation`] when it only contains whitespace.
pub fn read_token(path: &Path,) -> Result<String, Error,>
{
    let raw = fs::read_to_string(path,).map_err(|source| io_error(path, source,),)?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(Error::validation(format!("github token file {} is empty", path.display()),),);
    }
    Ok(token.to_owned(),)
}

#[derive(Debug, Deserialize,)]
struct Response<T,>
{
    data:   Option<T,>,
    #[serde(default)]
    errors: Vec<ResponseError,>,
}

#[derive(Debug, Deserialize,)]
struct ResponseError
{
    message: String,
}

/// Executes `request` and decodes its `data` member into `T`.
///
/// # Errors
///
/// Returns [`Error::Query`] naming the operation and its variables when the
/// transport fails, or the response reports errors, lacks data or does not
/// match `T`.
pub async fn run_query<E, T,>(executor: &E, request: &GraphQlRequest,) -> Result<T, Error,>
where
    E: GraphQlExecutor,
    T: DeserializeOwned,
{
    let query_error = |message: String| Error::Query {
        operation: request.operation.to_owned(),
        variables: request.variables.to_string(),
        message,
    };
    let body = executor.execute(request,).await.map_err(|e| query_error(e.detail(),),)?;

    let response: Response<T,> =
        serde_json::from_value(body,).map_err(|e| query_error(format!("unexpected response: {e}"),),)?;

    if !response.errors.is_empty() {
        let messages: Vec<&str,> =
            response.errors.iter().map(|error| error.message.as_str(),).collect();
        return Err(query_error(messages.join("; ",),),);
    }

    response.data.ok_or_else(|| query_error("response contained no data".to_owned(),),)
}
