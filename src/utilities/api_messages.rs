#[derive(Debug)]
#[allow(dead_code)]
pub enum APIMessages {
    // Generic Errors
    InternalServerError,
    BadRequest,
    Unauthorized,
    NotFound,
    Forbidden,
    // Token
    Token(TokenMessages),
    // Generic
    Input(InputMessages),
    // Storage
    Mongo(MongoMessages),
    // Entities
    Customer(CustomerMessages),
    Provider(ProviderMessages),
    Service(ServiceMessages),
    Subscription(SubscriptionMessages),
}

#[derive(Debug)]
pub enum TokenMessages {
    Missing,
    Expired,
    ErrorValidating,
    ErrorParsingToken,
    UnknownRole,
}

#[derive(Debug)]
pub enum InputMessages {
    InvalidReasonLength,
    InvalidSpecialInstructionsLength,
    InvalidVisitStatus,
    InvalidDate,
    InvalidStatusFilter,
}

#[derive(Debug)]
pub enum MongoMessages {
    ErrorInserting,
    ErrorFetching,
    ErrorUpdating,
}

#[derive(Debug)]
pub enum CustomerMessages {
    ProfileNotFound,
}

#[derive(Debug)]
pub enum ProviderMessages {
    ProfileNotFound,
}

#[derive(Debug)]
pub enum ServiceMessages {
    NotFoundOrInactive,
}

#[derive(Debug)]
pub enum SubscriptionMessages {
    Created,
    Found,
    NotFound,
    Updated,
    Paused,
    Resumed,
    Cancelled,
    Renewed,
    Activated,
    Expired,
    AccessDenied,
    VisitRecorded,
    ScheduleUpdated,
    Rescheduled,
    PaymentMethodUpdated,
    DiscountApplied,
    DiscountRemoved,
    CountersRecounted,
    RecountTargetMissing,
}

impl ToString for APIMessages {
    fn to_string(&self) -> String {
        match self {
            APIMessages::InternalServerError => "generic.internal_server_error".to_string(),
            APIMessages::BadRequest => "generic.bad_request".to_string(),
            APIMessages::Unauthorized => "generic.unauthorized".to_string(),
            APIMessages::NotFound => "generic.not_found".to_string(),
            APIMessages::Forbidden => "generic.forbidden".to_string(),
            APIMessages::Token(token_message) => token_message.to_string(),
            APIMessages::Input(input_message) => input_message.to_string(),
            APIMessages::Mongo(mongo_message) => mongo_message.to_string(),
            APIMessages::Customer(customer_message) => customer_message.to_string(),
            APIMessages::Provider(provider_message) => provider_message.to_string(),
            APIMessages::Service(service_message) => service_message.to_string(),
            APIMessages::Subscription(subscription_message) => subscription_message.to_string(),
        }
    }
}

impl ToString for TokenMessages {
    fn to_string(&self) -> String {
        match self {
            TokenMessages::Missing => "token.missing".to_string(),
            TokenMessages::Expired => "token.expired".to_string(),
            TokenMessages::ErrorValidating => "token.error_validating".to_string(),
            TokenMessages::ErrorParsingToken => "token.error_parsing_token".to_string(),
            TokenMessages::UnknownRole => "token.unknown_role".to_string(),
        }
    }
}

impl ToString for InputMessages {
    fn to_string(&self) -> String {
        match self {
            InputMessages::InvalidReasonLength => "input.invalid_reason_length".to_string(),
            InputMessages::InvalidSpecialInstructionsLength => {
                "input.invalid_special_instructions_length".to_string()
            }
            InputMessages::InvalidVisitStatus => "input.invalid_visit_status".to_string(),
            InputMessages::InvalidDate => "input.invalid_date".to_string(),
            InputMessages::InvalidStatusFilter => "input.invalid_status_filter".to_string(),
        }
    }
}

impl ToString for MongoMessages {
    fn to_string(&self) -> String {
        match self {
            MongoMessages::ErrorInserting => "storage.mongo_error_inserting".to_string(),
            MongoMessages::ErrorFetching => "storage.mongo_error_fetching".to_string(),
            MongoMessages::ErrorUpdating => "storage.mongo_error_updating".to_string(),
        }
    }
}

impl ToString for CustomerMessages {
    fn to_string(&self) -> String {
        match self {
            CustomerMessages::ProfileNotFound => "customer.profile_not_found".to_string(),
        }
    }
}

impl ToString for ProviderMessages {
    fn to_string(&self) -> String {
        match self {
            ProviderMessages::ProfileNotFound => "provider.profile_not_found".to_string(),
        }
    }
}

impl ToString for ServiceMessages {
    fn to_string(&self) -> String {
        match self {
            ServiceMessages::NotFoundOrInactive => "service.not_found_or_inactive".to_string(),
        }
    }
}

impl ToString for SubscriptionMessages {
    fn to_string(&self) -> String {
        match self {
            SubscriptionMessages::Created => "subscription.created".to_string(),
            SubscriptionMessages::Found => "subscription.found".to_string(),
            SubscriptionMessages::NotFound => "subscription.not_found".to_string(),
            SubscriptionMessages::Updated => "subscription.updated".to_string(),
            SubscriptionMessages::Paused => "subscription.paused".to_string(),
            SubscriptionMessages::Resumed => "subscription.resumed".to_string(),
            SubscriptionMessages::Cancelled => "subscription.cancelled".to_string(),
            SubscriptionMessages::Renewed => "subscription.renewed".to_string(),
            SubscriptionMessages::Activated => "subscription.activated".to_string(),
            SubscriptionMessages::Expired => "subscription.expired".to_string(),
            SubscriptionMessages::AccessDenied => "subscription.access_denied".to_string(),
            SubscriptionMessages::VisitRecorded => "subscription.visit_recorded".to_string(),
            SubscriptionMessages::ScheduleUpdated => "subscription.schedule_updated".to_string(),
            SubscriptionMessages::Rescheduled => "subscription.rescheduled".to_string(),
            SubscriptionMessages::PaymentMethodUpdated => {
                "subscription.payment_method_updated".to_string()
            }
            SubscriptionMessages::DiscountApplied => "subscription.discount_applied".to_string(),
            SubscriptionMessages::DiscountRemoved => "subscription.discount_removed".to_string(),
            SubscriptionMessages::CountersRecounted => {
                "subscription.counters_recounted".to_string()
            }
            SubscriptionMessages::RecountTargetMissing => {
                "subscription.recount_target_missing".to_string()
            }
        }
    }
}
