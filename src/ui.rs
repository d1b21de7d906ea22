use crate::models::ProjectInfo;

pub fn render_index(projects: &[ProjectInfo]) -> String {
    let options = projects
        .iter()
        .map(|project| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape_html(&project.id),
                escape_html(&project.name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    INDEX_HTML.replace("{{PROJECT_OPTIONS}}", &options)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>RDO &amp; Progress Dashboard</title>
  <style>
    :root {
      --bg: #eef2f8;
      --ink: #1f2933;
      --accent: #1e3a8a;
      --accent-2: #b91c1c;
      --card: #ffffff;
      --muted: #6b7280;
      --shadow: 0 18px 40px rgba(30, 58, 138, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      display: grid;
      grid-template-columns: 260px 1fr;
    }

    aside {
      background: var(--accent);
      color: white;
      padding: 28px 22px;
      display: grid;
      align-content: start;
      gap: 18px;
    }

    aside h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    aside select,
    aside button {
      width: 100%;
    }

    aside .info {
      font-size: 0.85rem;
      line-height: 1.5;
      opacity: 0.9;
    }

    main {
      padding: 32px;
      display: grid;
      gap: 24px;
      align-content: start;
    }

    h1 {
      margin: 0;
      font-size: 1.6rem;
      color: var(--accent);
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
      display: grid;
      gap: 16px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-weight: 600;
      color: var(--accent-2);
      font-size: 0.92rem;
    }

    input,
    select,
    textarea {
      font: inherit;
      padding: 9px 11px;
      border-radius: 10px;
      border: 1px solid #cbd5e1;
      color: var(--ink);
    }

    textarea {
      min-height: 70px;
      resize: vertical;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: #e2e8f0;
      color: var(--ink);
    }

    .nav button.active {
      background: white;
      color: var(--accent);
    }

    .errors {
      display: none;
      background: #fee2e2;
      color: #991b1b;
      border-radius: 12px;
      padding: 12px 16px;
    }

    .errors.visible {
      display: block;
    }

    .errors ul {
      margin: 6px 0 0;
      padding-left: 18px;
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }

    .status[data-type="ok"] {
      color: #166534;
    }

    .kpis {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 14px;
    }

    .kpi {
      background: #f8fafc;
      border-radius: 14px;
      padding: 14px;
      display: grid;
      gap: 6px;
    }

    .kpi .label {
      font-size: 0.78rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .kpi .value {
      font-size: 1.4rem;
      font-weight: 700;
      color: var(--accent);
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .tab {
      background: #e2e8f0;
      color: var(--ink);
      padding: 8px 14px;
    }

    .tab.active {
      background: var(--accent);
      color: white;
    }

    #chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-bar {
      fill: #16a34a;
    }

    .chart-grid {
      stroke: rgba(30, 58, 138, 0.12);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.9rem;
    }

    th,
    td {
      padding: 8px 10px;
      border-bottom: 1px solid #e5e7eb;
      text-align: right;
    }

    th:first-child,
    td:first-child,
    th:nth-child(2),
    td:nth-child(2) {
      text-align: left;
    }

    [hidden] {
      display: none !important;
    }

    @media (max-width: 800px) {
      body {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <aside>
    <h2>Configuration</h2>
    <label style="color: white">Contract
      <select id="project">
          {{PROJECT_OPTIONS}}
      </select>
    </label>
    <div class="nav">
      <button type="button" class="active" data-view="rdo">Daily log (RDO)</button>
      <button type="button" data-view="dashboard" style="margin-top: 8px">Dashboard</button>
    </div>
    <div class="info" id="project-info"></div>
  </aside>

  <main>
    <section id="view-rdo">
      <h1 id="form-title">Daily site log (RDO)</h1>
      <form id="rdo-form" class="card">
        <div class="errors" id="errors"></div>
        <div class="grid">
          <label>Execution date<input type="date" name="entry_date" /></label>
          <label>Execution day<input type="text" name="sequence_label" placeholder="Day 15 - regular shift" /></label>
          <label>Weather conditions
            <select name="weather">
              <option value="">--</option>
              <option>Sunny</option>
              <option>Cloudy</option>
              <option>Light rain</option>
              <option>Storm</option>
            </select>
          </label>
          <label>Incidents or accidents
            <select name="incidents">
              <option>No incidents</option>
              <option>Minor incident</option>
              <option>Serious accident</option>
            </select>
          </label>
          <label>Cumulative physical progress (%)<input type="number" name="cumulative_physical_pct" min="0" max="100" step="0.01" /></label>
          <label>Cumulative financial progress ($)<input type="number" name="cumulative_financial_amount" min="0" step="0.01" /></label>
        </div>
        <div class="grid">
          <label>Prorated progress by milestone<input type="text" name="milestone_progress" placeholder="Milestone 1: 100% | Milestone 2: 45%" /></label>
          <label>Performance indicators<input type="text" name="performance_indicators" placeholder="CPI: 1.05 | SPI: 0.98" /></label>
          <label>Quantity table and daily report checked
            <select name="quantity_control">
              <option value="">--</option>
              <option>Yes - verified on site</option>
              <option>No</option>
            </select>
          </label>
          <label>Complementary contracts<input type="text" name="complementary_contracts" /></label>
          <label>Work orders<input type="text" name="work_orders" /></label>
          <label>Quantity increases<input type="text" name="quantity_increase" /></label>
        </div>
        <label>Personnel and equipment<textarea name="personnel_equipment"></textarea></label>
        <label>Activities performed<textarea name="narrative"></textarea></label>
        <label>Supervisor observations<textarea name="observations"></textarea></label>
        <div class="grid">
          <label>Photographic evidence<input type="file" name="evidence" multiple accept="image/*" /></label>
          <label>Supervisor signature<input type="text" name="supervisor_signature" /></label>
          <label>Contractor signature<input type="text" name="contractor_signature" /></label>
        </div>
        <div class="tabs">
          <button type="submit" id="submit-btn">Save daily log</button>
          <button type="button" class="secondary" id="cancel-edit" hidden>Cancel correction</button>
        </div>
        <div class="status" id="status"></div>
      </form>
    </section>

    <section id="view-dashboard" hidden>
      <h1>Progress dashboard</h1>
      <div class="card">
        <div class="status" id="issued-at"></div>
        <div class="kpis">
          <div class="kpi"><span class="label">Physical progress</span><span class="value" id="kpi-physical">--</span></div>
          <div class="kpi"><span class="label">Financial progress</span><span class="value" id="kpi-financial">--</span></div>
          <div class="kpi"><span class="label">Executed amount</span><span class="value" id="kpi-executed">--</span></div>
          <div class="kpi"><span class="label">Remaining balance</span><span class="value" id="kpi-remaining">--</span></div>
        </div>
      </div>
      <div class="card">
        <div class="tabs" role="tablist">
          <button class="tab active" type="button" data-series="cumulative_physical_pct">Cumulative physical %</button>
          <button class="tab" type="button" data-series="cumulative_financial_amount">Cumulative payments $</button>
          <button class="tab" type="button" data-series="daily_financial_amount">Daily payments $</button>
          <button class="tab" type="button" data-series="remaining_balance">Remaining balance $</button>
        </div>
        <svg id="chart" viewBox="0 0 640 280" role="img" aria-label="Progress chart"></svg>
      </div>
      <div class="card">
        <table>
          <thead>
            <tr>
              <th>Date</th><th>Day</th><th>Cum. %</th><th>Daily %</th>
              <th>Cum. $</th><th>Daily $</th><th>Remaining $</th><th></th>
            </tr>
          </thead>
          <tbody id="entries"></tbody>
        </table>
      </div>
    </section>
  </main>

  <script>
    const projectEl = document.getElementById('project');
    const projectInfoEl = document.getElementById('project-info');
    const formEl = document.getElementById('rdo-form');
    const formTitleEl = document.getElementById('form-title');
    const errorsEl = document.getElementById('errors');
    const statusEl = document.getElementById('status');
    const submitBtn = document.getElementById('submit-btn');
    const cancelEditBtn = document.getElementById('cancel-edit');
    const chartEl = document.getElementById('chart');
    const entriesEl = document.getElementById('entries');
    const tabs = Array.from(document.querySelectorAll('.tab'));
    const navButtons = Array.from(document.querySelectorAll('.nav button'));

    let projects = [];
    let dashboard = null;
    let activeSeries = 'cumulative_physical_pct';
    let editingDate = null;

    const money = (value) => '$ ' + Number(value).toLocaleString('en-US', { minimumFractionDigits: 2, maximumFractionDigits: 2 });
    const pct = (value) => Number(value).toFixed(2).replace(/\.00$/, '') + '%';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const showErrors = (title, violations) => {
      if (!title) {
        errorsEl.classList.remove('visible');
        errorsEl.innerHTML = '';
        return;
      }
      const items = (violations || [])
        .map((v) => `<li><strong>${v.field}</strong>: ${v.message}</li>`)
        .join('');
      errorsEl.innerHTML = `<strong>${title}</strong>${items ? `<ul>${items}</ul>` : ''}`;
      errorsEl.classList.add('visible');
    };

    const currentProject = () => projects.find((p) => p.id === projectEl.value);

    const renderProjectInfo = () => {
      const project = currentProject();
      if (!project) {
        projectInfoEl.textContent = '';
        return;
      }
      const supervision = project.supervision_contract_amount == null ? '--' : money(project.supervision_contract_amount);
      projectInfoEl.innerHTML = `
        <div><strong>Contractor:</strong> ${project.contractor || '--'}</div>
        <div><strong>Works contract:</strong> ${money(project.contract_total_amount)}</div>
        <div><strong>Supervision contract:</strong> ${supervision}</div>
        <div><strong>Contract start:</strong> ${project.contract_start}</div>`;
    };

    const renderChart = () => {
      const bars = activeSeries === 'daily_financial_amount';
      const points = dashboard ? dashboard.series[activeSeries] : [];
      if (!points.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No entries yet</text>';
        return;
      }

      const width = 640;
      const height = 280;
      const paddingX = 64;
      const paddingY = 34;
      const top = 20;

      const values = points.map((point) => point.value);
      let min = Math.min(0, ...values);
      let max = Math.max(0, ...values);
      if (min === max) {
        max += 1;
      }

      const range = max - min;
      const slots = bars ? points.length : Math.max(points.length - 1, 1);
      const xStep = (width - paddingX * 2) / slots;
      const scaleY = (height - top - paddingY) / range;
      const x = (index) => paddingX + index * xStep + (bars ? xStep / 2 : 0);
      const y = (value) => height - paddingY - (value - min) * scaleY;

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = min + (range * i) / 4;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 8}" y="${y(value) + 4}" text-anchor="end">${Math.round(value).toLocaleString('en-US')}</text>`;
      }

      const labelEvery = points.length > 10 ? Math.ceil(points.length / 10) : 1;
      const xLabels = points
        .map((point, index) => index % labelEvery === 0
          ? `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.date.slice(5)}</text>`
          : '')
        .join('');

      let body;
      if (bars) {
        const barWidth = Math.max(xStep * 0.6, 2);
        body = points
          .map((point, index) => `<rect class="chart-bar" x="${x(index) - barWidth / 2}" y="${y(point.value)}" width="${barWidth}" height="${y(0) - y(point.value)}" />`)
          .join('');
      } else {
        const path = points
          .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.value).toFixed(2)}`)
          .join(' ');
        const circles = points
          .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.value)}" r="4" />`)
          .join('');
        body = `<path class="chart-line" d="${path}" />${circles}`;
      }

      chartEl.innerHTML = `${grid}${body}${xLabels}`;
    };

    const renderTable = () => {
      const entries = dashboard ? dashboard.entries : [];
      entriesEl.innerHTML = entries
        .map((entry) => `
          <tr>
            <td>${entry.entry_date}</td>
            <td>
              <details>
                <summary>${entry.sequence_label}</summary>
                <div>Milestones: ${entry.milestone_progress || '--'}</div>
                <div>Indicators: ${entry.performance_indicators || '--'}</div>
                <div>Quantity control: ${entry.quantity_control || '--'}</div>
                <div>Complementary contracts: ${entry.complementary_contracts || '--'}</div>
                <div>Work orders: ${entry.work_orders || '--'}</div>
                <div>Quantity increases: ${entry.quantity_increase || '--'}</div>
              </details>
            </td>
            <td>${pct(entry.cumulative_physical_pct)}</td>
            <td>${pct(entry.daily_physical_pct)}</td>
            <td>${money(entry.cumulative_financial_amount)}</td>
            <td>${money(entry.daily_financial_amount)}</td>
            <td>${money(entry.remaining_balance)}</td>
            <td><button type="button" class="secondary" data-edit="${entry.entry_date}">Correct</button></td>
          </tr>`)
        .join('');
    };

    const renderDashboard = () => {
      if (!dashboard) {
        return;
      }
      const summary = dashboard.summary;
      document.getElementById('issued-at').textContent = `Issued ${dashboard.issued_at.replace('T', ' ')}`;
      document.getElementById('kpi-physical').textContent = pct(summary.cumulative_physical_pct);
      document.getElementById('kpi-financial').textContent = pct(summary.financial_progress_pct);
      document.getElementById('kpi-executed').textContent = money(summary.cumulative_financial_amount);
      document.getElementById('kpi-remaining').textContent = money(summary.remaining_balance);
      renderChart();
      renderTable();
    };

    const loadDashboard = async () => {
      const res = await fetch(`/api/projects/${encodeURIComponent(projectEl.value)}/dashboard`);
      if (!res.ok) {
        throw new Error('Unable to load dashboard');
      }
      dashboard = await res.json();
      renderDashboard();
    };

    const readNumber = (value) => (value === '' ? null : Number(value));

    const textFields = ['sequence_label', 'weather', 'incidents', 'narrative', 'observations',
      'personnel_equipment', 'supervisor_signature', 'contractor_signature', 'milestone_progress',
      'performance_indicators', 'quantity_control', 'complementary_contracts', 'work_orders',
      'quantity_increase'];

    const readForm = () => {
      const data = new FormData(formEl);
      const evidence = formEl.elements.evidence.files.length;
      const payload = {
        cumulative_physical_pct: readNumber(data.get('cumulative_physical_pct')),
        cumulative_financial_amount: readNumber(data.get('cumulative_financial_amount'))
      };
      for (const name of textFields) {
        payload[name] = data.get(name) || '';
      }
      if (editingDate) {
        if (evidence > 0) {
          payload.evidence_count = evidence;
        }
      } else {
        payload.entry_date = data.get('entry_date') || null;
        payload.evidence_count = evidence;
      }
      return payload;
    };

    const setEditing = (entry) => {
      editingDate = entry ? entry.entry_date : null;
      formEl.elements.entry_date.disabled = Boolean(entry);
      cancelEditBtn.hidden = !entry;
      submitBtn.textContent = entry ? `Save correction for ${entry.entry_date}` : 'Save daily log';
      formTitleEl.textContent = entry ? `Correct daily log ${entry.entry_date}` : 'Daily site log (RDO)';
      if (!entry) {
        formEl.reset();
        return;
      }
      for (const name of ['entry_date', 'cumulative_physical_pct', 'cumulative_financial_amount', ...textFields]) {
        formEl.elements[name].value = entry[name] ?? '';
      }
    };

    const submit = async () => {
      const project = encodeURIComponent(projectEl.value);
      const url = editingDate
        ? `/api/projects/${project}/entries/${editingDate}`
        : `/api/projects/${project}/entries`;
      const res = await fetch(url, {
        method: editingDate ? 'PUT' : 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(readForm())
      });
      if (!res.ok) {
        let body = null;
        try {
          body = await res.json();
        } catch (_) {
          body = { error: await res.text(), violations: [] };
        }
        showErrors(body.error || 'Request failed', body.violations);
        setStatus('', '');
        return;
      }
      showErrors(null);
      setStatus(editingDate ? 'Correction saved' : 'Daily log saved', 'ok');
      setEditing(null);
      await loadDashboard();
    };

    const showView = (view) => {
      navButtons.forEach((button) => button.classList.toggle('active', button.dataset.view === view));
      document.getElementById('view-rdo').hidden = view !== 'rdo';
      document.getElementById('view-dashboard').hidden = view !== 'dashboard';
      if (view === 'dashboard') {
        loadDashboard().catch((err) => setStatus(err.message, 'error'));
      }
    };

    formEl.addEventListener('submit', (event) => {
      event.preventDefault();
      submit().catch((err) => showErrors(err.message, []));
    });

    cancelEditBtn.addEventListener('click', () => setEditing(null));

    entriesEl.addEventListener('click', (event) => {
      const date = event.target.dataset.edit;
      if (!date || !dashboard) {
        return;
      }
      const entry = dashboard.entries.find((item) => item.entry_date === date);
      setEditing(entry);
      showView('rdo');
    });

    tabs.forEach((button) => {
      button.addEventListener('click', () => {
        activeSeries = button.dataset.series;
        tabs.forEach((tab) => tab.classList.toggle('active', tab === button));
        renderChart();
      });
    });

    navButtons.forEach((button) => {
      button.addEventListener('click', () => showView(button.dataset.view));
    });

    projectEl.addEventListener('change', () => {
      setEditing(null);
      showErrors(null);
      renderProjectInfo();
      loadDashboard().catch((err) => setStatus(err.message, 'error'));
    });

    fetch('/api/projects')
      .then((res) => res.json())
      .then((list) => {
        projects = list;
        renderProjectInfo();
        return loadDashboard();
      })
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
