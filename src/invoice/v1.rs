use super::model::{DateRange, InvoiceList};
use super::service;
use crate::conf::Conf;
use crate::Error;
use actix_web::get;
use actix_web::post;
use actix_web::web::Data;
use actix_web::web::Json;
use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::OffsetDateTime;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Deserialize, Serialize)]
pub struct FormDefaults {
    #[serde(with = "iso_date")]
    pub date_from: Date,
    #[serde(with = "iso_date")]
    pub date_to: Date,
}

#[derive(Deserialize, Serialize)]
pub struct SearchArgs {
    #[serde(with = "iso_date")]
    pub date_from: Date,
    #[serde(with = "iso_date")]
    pub date_to: Date,
}

/// Default form values: the previous calendar month, derived from the
/// current date on every request.
#[get("form")]
pub async fn get_form() -> Result<Json<FormDefaults>, Error> {
    let range = DateRange::previous_month(OffsetDateTime::now_utc().date())?;
    Ok(Json(FormDefaults {
        date_from: range.from,
        date_to: range.to,
    }))
}

#[post("search")]
pub async fn post_search(
    args: Json<SearchArgs>,
    conf: Data<Conf>,
) -> Result<Json<InvoiceList>, Error> {
    let range = DateRange::new(args.date_from, args.date_to)?;
    let res = service::fetch_invoice_list(&range, &conf).await?;
    Ok(Json(res))
}
