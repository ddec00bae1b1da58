//! HTTP endpoints. Each takes a csv upload, either as the `file` part of a
//! multipart form or as the raw request body, and answers with the converted
//! file as an attachment.

use actix_multipart::form::{bytes::Bytes as FilePart, text::Text, MultipartForm};
use actix_web::{http::StatusCode, post, web, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use chrono::Local;
use log::{error, warn};
use serde_json::json;

use crate::{
    archive, clf,
    coverage::{self, Converter},
    error::ConvertError,
    points::{self, PointStyle},
};

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(coverage_service)
        .service(points_service)
        .service(clf_service);
}

#[derive(MultipartForm)]
struct UploadForm {
    file: FilePart,
    color: Option<Text<String>>,
    size: Option<Text<f64>>,
    icon: Option<Text<String>>,
}

/// Points options sent as form fields next to the file.
#[derive(Default)]
struct FormStyle {
    color: Option<String>,
    size: Option<f64>,
    icon: Option<String>,
}

impl FormStyle {
    fn apply(self, style: &mut PointStyle) {
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(size) = self.size {
            style.size = size;
        }
        if let Some(icon) = self.icon {
            style.icon = icon;
        }
    }
}

async fn read_upload(
    req: &HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<(web::Bytes, FormStyle)> {
    let mut payload = payload.into_inner();
    if !req.content_type().eq_ignore_ascii_case("multipart/form-data") {
        let body = web::Bytes::from_request(req, &mut payload).await?;
        return Ok((body, FormStyle::default()));
    }

    let form = MultipartForm::<UploadForm>::from_request(req, &mut payload)
        .await?
        .into_inner();
    let style = FormStyle {
        color: form.color.map(Text::into_inner),
        size: form.size.map(Text::into_inner),
        icon: form.icon.map(Text::into_inner),
    };
    Ok((form.file.data, style))
}

fn attachment(body: Vec<u8>, filename: &str, content_type: &str) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("content-type", content_type))
        .insert_header((
            "content-disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(body)
}

fn json_error(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
        }
    }))
}

/// Answers a request that never reached conversion: a bad form, a bad query
/// string or an unreadable body.
fn rejected(error: actix_web::Error) -> HttpResponse {
    warn!("rejected request: {error}");
    json_error(error.as_response_error().status_code(), error.to_string())
}

fn error_response(error: ConvertError) -> HttpResponse {
    if error.is_input_error() {
        warn!("rejected upload: {error}");
        json_error(StatusCode::BAD_REQUEST, error.to_string())
    } else {
        error!("conversion failed: {error}");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

#[post("/coverage-kmz")]
pub async fn coverage_service(
    req: HttpRequest,
    payload: web::Payload,
    converter: web::Data<Converter>,
) -> actix_web::Result<HttpResponse> {
    let body = match read_upload(&req, payload).await {
        Ok((body, _)) => body,
        Err(e) => return Ok(rejected(e)),
    };
    let converter = converter.into_inner();
    let name = coverage::coverage_name(Local::now());

    let document = name.clone();
    let result = web::block(move || converter.coverage_kmz(&body, &document)).await?;
    Ok(match result {
        Ok(kmz) => attachment(
            kmz,
            &format!("{name}.kmz"),
            "application/vnd.google-earth.kmz",
        ),
        Err(e) => error_response(e),
    })
}

#[post("/points-kmz")]
pub async fn points_service(
    req: HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let (body, form_style) = match read_upload(&req, payload).await {
        Ok(upload) => upload,
        Err(e) => return Ok(rejected(e)),
    };
    let mut style = match web::Query::<PointStyle>::from_query(req.query_string()) {
        Ok(query) => query.into_inner(),
        Err(e) => return Ok(rejected(e.into())),
    };
    form_style.apply(&mut style);
    let name = points::points_name(Local::now());

    let document = name.clone();
    let result = web::block(move || {
        let kml = points::render(&body, &style, &document)?;
        archive::kmz(archive::KML_ENTRY, &kml)
    })
    .await?;
    Ok(match result {
        Ok(kmz) => attachment(
            kmz,
            &format!("{name}.kmz"),
            "application/vnd.google-earth.kmz",
        ),
        Err(e) => error_response(e),
    })
}

#[post("/convert-clf")]
pub async fn clf_service(
    req: HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let body = match read_upload(&req, payload).await {
        Ok((body, _)) => body,
        Err(e) => return Ok(rejected(e)),
    };
    let name = clf::clf_name(Local::now());

    let result = web::block(move || clf::convert(&body)).await?;
    Ok(match result {
        Ok(text) => attachment(text.into_bytes(), &format!("{name}.clf"), "text/plain"),
        Err(e) => error_response(e),
    })
}
