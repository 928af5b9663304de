//! Account lifecycle: signup, profile lookup and profile edits.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use chrono::Utc;
use log::{debug, info, warn};
use rand::RngCore;

use crate::{
    errors::{EntityKind, SocialError, SocialResult},
    id::UserId,
    media::MediaHost,
    service::{Network, profile},
    store::EntityStore,
    types::{ActingUser, ProfileUpdate, PublicProfile, Signup, UserRecord},
    validators::{MIN_PASSWORD_LENGTH, is_valid_email, is_valid_url, is_valid_username, non_blank},
};

const SALT_LENGTH: usize = 16;

fn hash_password(password: &str) -> SocialResult<String> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| SocialError::invalid(format!("could not encode password salt: {err}")))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| SocialError::invalid(format!("could not hash password: {err}")))?;
    Ok(hash.to_string())
}

fn checked_username(value: &str) -> SocialResult<String> {
    let username = value.trim();
    if !is_valid_username(username) {
        return Err(SocialError::invalid("username must be 1-30 letters, digits, '_' or '.'"));
    }
    Ok(username.to_string())
}

fn checked_email(value: &str) -> SocialResult<String> {
    let email = value.trim();
    if !is_valid_email(email) {
        return Err(SocialError::invalid("invalid email format"));
    }
    Ok(email.to_string())
}

impl<S: EntityStore, M: MediaHost> Network<S, M> {
    /// Register a new account. Username collisions are reported before email collisions.
    pub async fn signup(&self, request: Signup) -> SocialResult<PublicProfile> {
        let username = checked_username(&request.username)?;
        let email = checked_email(&request.email)?;
        let Some(full_name) = non_blank(Some(request.full_name.as_str())) else {
            return Err(SocialError::invalid("full name required"));
        };
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SocialError::invalid(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: UserId::generate(),
            username,
            email,
            password_hash: hash_password(&request.password)?,
            full_name,
            bio: None,
            link: None,
            profile_img: None,
            cover_img: None,
            followers: Default::default(),
            following: Default::default(),
            liked_posts: Default::default(),
            created_at: now,
            updated_at: now,
        };
        self.store().insert_user(&user).await?;
        info!("signed up {} as {}", user.username, user.id);
        Ok(profile(&user))
    }

    /// Public profile of `username`.
    pub async fn profile(&self, username: &str) -> SocialResult<PublicProfile> {
        self.store()
            .find_user_by_username(username)
            .await?
            .map(|user| profile(&user))
            .ok_or_else(|| SocialError::not_found(EntityKind::User, username))
    }

    /// Apply a partial profile edit. Blank values keep the current field.
    ///
    /// New images are uploaded before the save. The previous assets are destroyed only once the
    /// save succeeded; a failed save destroys the fresh uploads instead.
    pub async fn update_profile(&self, actor: &ActingUser, update: ProfileUpdate) -> SocialResult<PublicProfile> {
        let mut user = self.require_user(&actor.id).await?;

        if let Some(username) = non_blank(update.username.as_deref()) {
            user.username = checked_username(&username)?;
        }
        if let Some(email) = non_blank(update.email.as_deref()) {
            user.email = checked_email(&email)?;
        }
        if let Some(link) = non_blank(update.link.as_deref()) {
            if !is_valid_url(&link) {
                return Err(SocialError::invalid("link must be a valid URL"));
            }
            user.link = Some(link);
        }
        if let Some(full_name) = non_blank(update.full_name.as_deref()) {
            user.full_name = full_name;
        }
        if let Some(bio) = non_blank(update.bio.as_deref()) {
            user.bio = Some(bio);
        }

        let mut uploaded = Vec::new();
        let mut replaced = Vec::new();
        for (slot, bytes) in [
            (&mut user.profile_img, update.profile_img),
            (&mut user.cover_img, update.cover_img),
        ] {
            let Some(bytes) = bytes.filter(|bytes| !bytes.is_empty()) else {
                continue;
            };
            match self.media().upload(&bytes).await {
                Ok(url) => {
                    replaced.extend(slot.replace(url.clone()));
                    uploaded.push(url);
                }
                Err(err) => {
                    self.discard_uploads(&uploaded).await;
                    return Err(err.into());
                }
            }
        }

        user.updated_at = Utc::now();
        if let Err(err) = self.store().save_user(&user).await {
            self.discard_uploads(&uploaded).await;
            return Err(err.into());
        }
        for url in &replaced {
            if let Err(err) = self.media().destroy(url).await {
                warn!("previous image {url} of {} was not released: {err}", user.id);
            }
        }
        debug!("updated profile of {}", user.id);
        Ok(profile(&user))
    }

    async fn discard_uploads(&self, urls: &[String]) {
        for url in urls {
            if let Err(err) = self.media().destroy(url).await {
                warn!("orphaned upload {url} after failed profile update: {err}");
            }
        }
    }
}
